//! Application of a specification to a queryable source

use crate::core::query::{PaginatedResponse, PaginationMeta};
use crate::core::specification::{Specification, SpecificationParts};
use crate::core::store::Queryable;

/// Applies specifications in a fixed order
///
/// 1. filter (skipped when the predicate accepts everything)
/// 2. ordering on the composite sort key
/// 3. skip/take, only when paging is enabled
/// 4. includes, each declared relation
///
/// Paging must come after filtering, otherwise page contents and counts
/// would be computed over unfiltered data.
pub struct SpecificationEvaluator;

impl SpecificationEvaluator {
    pub fn apply<T, Q: Queryable<T>>(source: Q, spec: Specification<T>) -> Q {
        let parts = spec.into_parts();
        let query = Self::filtered(source, &parts);
        Self::windowed(query, &parts)
    }

    /// Apply the specification and report the filtered total alongside
    /// the requested page
    pub fn evaluate_page<T, Q: Queryable<T>>(
        source: Q,
        spec: Specification<T>,
    ) -> PaginatedResponse<T> {
        let parts = spec.into_parts();
        let query = Self::filtered(source, &parts);
        let total = query.count();

        let (page_index, page_size) = if parts.paging.enabled && parts.paging.take > 0 {
            (parts.paging.skip / parts.paging.take, parts.paging.take)
        } else {
            (0, 0)
        };

        let data = Self::windowed(query, &parts).into_vec();
        PaginatedResponse {
            data,
            pagination: PaginationMeta::new(page_index, page_size, total),
        }
    }

    fn filtered<T, Q: Queryable<T>>(source: Q, parts: &SpecificationParts) -> Q {
        let mut query = source;
        if !parts.criteria.is_always() {
            query = query.filter(&parts.criteria);
        }
        if !parts.sort_keys.is_empty() {
            query = query.order_by(&parts.sort_keys);
        }
        query
    }

    fn windowed<T, Q: Queryable<T>>(source: Q, parts: &SpecificationParts) -> Q {
        let mut query = source;
        if parts.paging.enabled {
            query = query.skip(parts.paging.skip).take(parts.paging.take);
        }
        for relation in &parts.includes {
            query = query.include(relation);
        }
        query
    }
}
