//! Comparison operators and their compilation into typed tests
//!
//! The operator set is closed. [`OperatorCompiler::compile`] dispatches over
//! it with an exhaustive `match`, producing a [`Comparison`]: a resolved field
//! accessor plus either a relational test against a coerced value or a
//! lexical test against the literal.

use crate::core::error::QueryError;
use crate::core::field::FieldValue;
use crate::core::reflect::Reflect;
use crate::core::resolver::FieldAccessor;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Comparison operator of a filter descriptor
///
/// The declaration order is the wire ordinal (`Contains` = 0 ... `EndsWith` = 9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    Contains,
    NotContains,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    NotEqual,
    Equal,
    StartsWith,
    EndsWith,
}

impl ComparisonOperator {
    pub const ALL: [ComparisonOperator; 10] = [
        ComparisonOperator::Contains,
        ComparisonOperator::NotContains,
        ComparisonOperator::LessThan,
        ComparisonOperator::LessThanOrEqual,
        ComparisonOperator::GreaterThan,
        ComparisonOperator::GreaterThanOrEqual,
        ComparisonOperator::NotEqual,
        ComparisonOperator::Equal,
        ComparisonOperator::StartsWith,
        ComparisonOperator::EndsWith,
    ];

    /// Operators that need an orderable field type
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            ComparisonOperator::LessThan
                | ComparisonOperator::LessThanOrEqual
                | ComparisonOperator::GreaterThan
                | ComparisonOperator::GreaterThanOrEqual
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOperator::Contains => "Contains",
            ComparisonOperator::NotContains => "NotContains",
            ComparisonOperator::LessThan => "LessThan",
            ComparisonOperator::LessThanOrEqual => "LessThanOrEqual",
            ComparisonOperator::GreaterThan => "GreaterThan",
            ComparisonOperator::GreaterThanOrEqual => "GreaterThanOrEqual",
            ComparisonOperator::NotEqual => "NotEqual",
            ComparisonOperator::Equal => "Equal",
            ComparisonOperator::StartsWith => "StartsWith",
            ComparisonOperator::EndsWith => "EndsWith",
        }
    }

    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// Case-insensitive lookup by variant name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator exactly as received on the wire
///
/// Clients may send the variant name or its ordinal. Decoding happens when
/// the filter is compiled so that one bad operator only drops its own filter;
/// any other JSON value is kept as `Other` and decodes to `NotSupported`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OperatorCode {
    Ordinal(i64),
    Name(String),
    Other(serde_json::Value),
}

impl OperatorCode {
    pub fn decode(&self) -> Result<ComparisonOperator, QueryError> {
        let decoded = match self {
            OperatorCode::Ordinal(ordinal) => ComparisonOperator::from_ordinal(*ordinal),
            OperatorCode::Name(name) => ComparisonOperator::from_name(name),
            OperatorCode::Other(_) => None,
        };
        decoded.ok_or_else(|| QueryError::NotSupported {
            operator: self.to_string(),
        })
    }
}

impl From<ComparisonOperator> for OperatorCode {
    fn from(op: ComparisonOperator) -> Self {
        OperatorCode::Name(op.as_str().to_string())
    }
}

impl fmt::Display for OperatorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorCode::Ordinal(ordinal) => write!(f, "{}", ordinal),
            OperatorCode::Name(name) => f.write_str(name),
            OperatorCode::Other(value) => write!(f, "{}", value),
        }
    }
}

/// Relational half of the operator set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalOp {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl RelationalOp {
    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            RelationalOp::LessThan => ordering == Ordering::Less,
            RelationalOp::LessThanOrEqual => ordering != Ordering::Greater,
            RelationalOp::GreaterThan => ordering == Ordering::Greater,
            RelationalOp::GreaterThanOrEqual => ordering != Ordering::Less,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            RelationalOp::LessThan => "<",
            RelationalOp::LessThanOrEqual => "<=",
            RelationalOp::GreaterThan => ">",
            RelationalOp::GreaterThanOrEqual => ">=",
        }
    }
}

/// Lexical half of the operator set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOp {
    Contains,
    NotContains,
    Equal,
    NotEqual,
    StartsWith,
    EndsWith,
}

impl TextOp {
    /// Ordinal (case-sensitive) string test
    pub fn accepts(self, text: &str, operand: &str) -> bool {
        match self {
            TextOp::Contains => text.contains(operand),
            TextOp::NotContains => !text.contains(operand),
            TextOp::Equal => text == operand,
            TextOp::NotEqual => text != operand,
            TextOp::StartsWith => text.starts_with(operand),
            TextOp::EndsWith => text.ends_with(operand),
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            TextOp::Contains => "contains",
            TextOp::NotContains => "not contains",
            TextOp::Equal => "==",
            TextOp::NotEqual => "!=",
            TextOp::StartsWith => "starts with",
            TextOp::EndsWith => "ends with",
        }
    }
}

/// The test a comparison applies to the field value
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonTest {
    /// Compare against a value already coerced to the field's type
    Relational { op: RelationalOp, operand: FieldValue },

    /// Compare the field's text form against the literal
    Text { op: TextOp, operand: String },
}

/// One compiled filter: field accessor plus test
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    accessor: FieldAccessor,
    test: ComparisonTest,
}

impl Comparison {
    pub fn accessor(&self) -> &FieldAccessor {
        &self.accessor
    }

    pub fn test(&self) -> &ComparisonTest {
        &self.test
    }

    /// Evaluate against one entity
    ///
    /// A null or unreachable field never matches, whatever the operator.
    pub fn matches(&self, entity: &dyn Reflect) -> bool {
        let Some(value) = self.accessor.read(entity) else {
            return false;
        };

        match &self.test {
            ComparisonTest::Relational { op, operand } => value
                .compare(operand)
                .is_some_and(|ordering| op.accepts(ordering)),
            ComparisonTest::Text { op, operand } => value
                .to_text()
                .is_some_and(|text| op.accepts(&text, operand)),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.test {
            ComparisonTest::Relational { op, operand } => {
                write!(f, "{} {} {}", self.accessor, op.symbol(), operand)
            }
            ComparisonTest::Text { op, operand } => {
                write!(f, "{} {} {:?}", self.accessor, op.keyword(), operand)
            }
        }
    }
}

/// Compiles (operator, accessor, literal) into a [`Comparison`]
pub struct OperatorCompiler;

impl OperatorCompiler {
    pub fn compile(
        op: ComparisonOperator,
        accessor: FieldAccessor,
        literal: &str,
    ) -> Result<Comparison, QueryError> {
        let test = match op {
            ComparisonOperator::LessThan => {
                Self::relational(RelationalOp::LessThan, &accessor, literal)?
            }
            ComparisonOperator::LessThanOrEqual => {
                Self::relational(RelationalOp::LessThanOrEqual, &accessor, literal)?
            }
            ComparisonOperator::GreaterThan => {
                Self::relational(RelationalOp::GreaterThan, &accessor, literal)?
            }
            ComparisonOperator::GreaterThanOrEqual => {
                Self::relational(RelationalOp::GreaterThanOrEqual, &accessor, literal)?
            }
            ComparisonOperator::Contains => Self::text(TextOp::Contains, literal),
            ComparisonOperator::NotContains => Self::text(TextOp::NotContains, literal),
            ComparisonOperator::Equal => Self::text(TextOp::Equal, literal),
            ComparisonOperator::NotEqual => Self::text(TextOp::NotEqual, literal),
            ComparisonOperator::StartsWith => Self::text(TextOp::StartsWith, literal),
            ComparisonOperator::EndsWith => Self::text(TextOp::EndsWith, literal),
        };

        Ok(Comparison { accessor, test })
    }

    fn relational(
        op: RelationalOp,
        accessor: &FieldAccessor,
        literal: &str,
    ) -> Result<ComparisonTest, QueryError> {
        let field_type = accessor.field_type();
        if !field_type.is_orderable() {
            return Err(QueryError::UnorderableField {
                field: accessor.path(),
                field_type,
            });
        }

        let operand = field_type
            .parse(literal)
            .ok_or_else(|| QueryError::ValueCoercion {
                field: accessor.path(),
                value: literal.to_string(),
                expected: field_type,
            })?;

        Ok(ComparisonTest::Relational { op, operand })
    }

    // Non-textual fields are compared through their text form, so the
    // literal is used as-is for every field type.
    fn text(op: TextOp, literal: &str) -> ComparisonTest {
        ComparisonTest::Text {
            op,
            operand: literal.to_string(),
        }
    }
}
