//! Boolean predicate trees over reflectable entities

use crate::core::operator::Comparison;
use crate::core::query::LogicalOperator;
use crate::core::reflect::Reflect;
use crate::core::resolver::FieldAccessor;
use std::fmt;

/// A compiled predicate
///
/// Built as a data tree rather than a closure so it can be inspected,
/// logged, and translated by downstream query executors.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Predicate {
    /// Accepts every entity
    #[default]
    Always,

    Compare(Comparison),

    And(Box<Predicate>, Box<Predicate>),

    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    pub fn matches(&self, entity: &dyn Reflect) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Compare(comparison) => comparison.matches(entity),
            Predicate::And(left, right) => left.matches(entity) && right.matches(entity),
            Predicate::Or(left, right) => left.matches(entity) || right.matches(entity),
        }
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Predicate::Always)
    }

    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    /// Join with `other` using the given connective
    pub fn combine(self, logic: LogicalOperator, other: Predicate) -> Predicate {
        match logic {
            LogicalOperator::And => self.and(other),
            LogicalOperator::Or => self.or(other),
        }
    }

    /// Left-to-right fold of comparisons under one connective
    ///
    /// An empty input yields [`Predicate::Always`].
    pub fn fold(comparisons: impl IntoIterator<Item = Comparison>, logic: LogicalOperator) -> Self {
        comparisons
            .into_iter()
            .map(Predicate::Compare)
            .reduce(|acc, next| acc.combine(logic, next))
            .unwrap_or_default()
    }

    /// Accessors of every leaf comparison, left to right
    pub fn accessors(&self) -> Vec<&FieldAccessor> {
        match self {
            Predicate::Always => Vec::new(),
            Predicate::Compare(comparison) => vec![comparison.accessor()],
            Predicate::And(left, right) | Predicate::Or(left, right) => {
                let mut accessors = left.accessors();
                accessors.extend(right.accessors());
                accessors
            }
        }
    }

    /// Number of leaf comparisons in the tree
    pub fn comparison_count(&self) -> usize {
        match self {
            Predicate::Always => 0,
            Predicate::Compare(_) => 1,
            Predicate::And(left, right) | Predicate::Or(left, right) => {
                left.comparison_count() + right.comparison_count()
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Always => f.write_str("true"),
            Predicate::Compare(comparison) => write!(f, "{}", comparison),
            Predicate::And(left, right) => write!(f, "({} AND {})", left, right),
            Predicate::Or(left, right) => write!(f, "({} OR {})", left, right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operator::{ComparisonOperator, OperatorCompiler};
    use crate::core::resolver::FieldPathResolver;
    use crate::entities::Property;

    fn comparison(op: ComparisonOperator, path: &str, literal: &str) -> Comparison {
        let accessor = FieldPathResolver::resolve::<Property>(path).unwrap();
        OperatorCompiler::compile(op, accessor, literal).unwrap()
    }

    #[test]
    fn test_empty_fold_is_always() {
        let predicate = Predicate::fold(Vec::new(), LogicalOperator::And);
        assert!(predicate.is_always());
        let p = Property::new("x", "y", "z", 1.0, 1);
        assert!(predicate.matches(&p));
    }

    #[test]
    fn test_fold_is_left_to_right() {
        let a = comparison(ComparisonOperator::Contains, "Name", "a");
        let b = comparison(ComparisonOperator::Contains, "Name", "b");
        let c = comparison(ComparisonOperator::Contains, "Name", "c");

        let folded = Predicate::fold(vec![a.clone(), b.clone(), c.clone()], LogicalOperator::Or);
        let expected = Predicate::Compare(a)
            .or(Predicate::Compare(b))
            .or(Predicate::Compare(c));
        assert_eq!(folded, expected);
        assert_eq!(folded.comparison_count(), 3);
    }

    #[test]
    fn test_and_or_semantics() {
        let cheap = comparison(ComparisonOperator::LessThan, "Price", "300");
        let park = comparison(ComparisonOperator::StartsWith, "Name", "Park");

        let p = Property::new("Parkside", "a", "b", 500.0, 1);
        let both = Predicate::fold(vec![cheap.clone(), park.clone()], LogicalOperator::And);
        let either = Predicate::fold(vec![cheap, park], LogicalOperator::Or);
        assert!(!both.matches(&p));
        assert!(either.matches(&p));
    }

    #[test]
    fn test_display() {
        let a = comparison(ComparisonOperator::GreaterThan, "Price", "5");
        let b = comparison(ComparisonOperator::Equal, "City", "Paris");
        let predicate = Predicate::fold(vec![a, b], LogicalOperator::And);
        assert_eq!(predicate.to_string(), "(price > 5 AND city == \"Paris\")");
        assert_eq!(Predicate::Always.to_string(), "true");
    }
}
