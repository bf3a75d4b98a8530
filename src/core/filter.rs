//! Compilation of filter descriptors into one predicate
//!
//! Each descriptor goes through operator decoding, field resolution and
//! operator compilation. A descriptor that fails any step is logged and
//! dropped; the others are folded left to right with the request's single
//! connective. A request therefore never fails because of one bad filter.

use crate::core::error::QueryError;
use crate::core::operator::{Comparison, OperatorCompiler};
use crate::core::predicate::Predicate;
use crate::core::query::{FilterDescriptor, LogicalOperator};
use crate::core::reflect::Reflect;
use crate::core::resolver::FieldPathResolver;

/// A descriptor that was dropped during compilation
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFilter {
    pub descriptor: FilterDescriptor,
    pub error: QueryError,
}

/// Result of compiling a request's filters
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilter {
    pub predicate: Predicate,
    pub skipped: Vec<SkippedFilter>,
}

impl CompiledFilter {
    /// Number of descriptors that made it into the predicate
    pub fn compiled_count(&self) -> usize {
        self.predicate.comparison_count()
    }

    /// Fail when filters were given but none of them compiled
    ///
    /// The engine itself always degrades to the remaining filters; callers
    /// that need at least one effective filter opt into this check.
    pub fn require_any(self) -> Result<Self, QueryError> {
        if self.predicate.is_always() && !self.skipped.is_empty() {
            return Err(QueryError::NoValidFilters {
                dropped: self.skipped.len(),
            });
        }
        Ok(self)
    }
}

pub struct FilterCompiler;

impl FilterCompiler {
    pub fn compile<T: Reflect>(
        filters: &[FilterDescriptor],
        logic: LogicalOperator,
    ) -> CompiledFilter {
        let entity_type = T::schema().type_name();
        let mut comparisons = Vec::with_capacity(filters.len());
        let mut skipped = Vec::new();

        for descriptor in filters {
            match Self::compile_one::<T>(descriptor) {
                Ok(comparison) => comparisons.push(comparison),
                Err(error) => {
                    if error.is_fatal() {
                        tracing::error!(
                            entity_type = entity_type,
                            field = %descriptor.target_field,
                            operator = %descriptor.operator,
                            error = %error,
                            "Rejected filter with unsupported operator"
                        );
                    } else {
                        tracing::warn!(
                            entity_type = entity_type,
                            field = %descriptor.target_field,
                            operator = %descriptor.operator,
                            value = %descriptor.value,
                            error = %error,
                            "Skipping filter that failed to compile"
                        );
                    }
                    skipped.push(SkippedFilter {
                        descriptor: descriptor.clone(),
                        error,
                    });
                }
            }
        }

        let predicate = Predicate::fold(comparisons, logic);
        tracing::debug!(
            entity_type = entity_type,
            predicate = %predicate,
            skipped = skipped.len(),
            "Compiled filter predicate"
        );

        CompiledFilter { predicate, skipped }
    }

    fn compile_one<T: Reflect>(descriptor: &FilterDescriptor) -> Result<Comparison, QueryError> {
        let operator = descriptor.operator.decode()?;
        let accessor = FieldPathResolver::resolve::<T>(&descriptor.target_field)?;
        OperatorCompiler::compile(operator, accessor, &descriptor.value)
    }
}
