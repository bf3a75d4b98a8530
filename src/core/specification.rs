//! Compiled query instructions for one entity type
//!
//! A [`Specification`] bundles the filter predicate, ordering, eager-load
//! includes and paging of a single query. It is built once, never mutated
//! afterwards, and consumed by value by the
//! [`SpecificationEvaluator`](crate::core::evaluator::SpecificationEvaluator).

use crate::core::error::QueryError;
use crate::core::filter::{FilterCompiler, SkippedFilter};
use crate::core::predicate::Predicate;
use crate::core::query::{QueryFilterRequest, SortDirection};
use crate::core::reflect::{Reflect, segment_matches};
use crate::core::resolver::{FieldAccessor, FieldPathResolver};
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

/// One ordering key
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub accessor: FieldAccessor,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(accessor: FieldAccessor, direction: SortDirection) -> Self {
        Self {
            accessor,
            direction,
        }
    }

    /// Compare two entities on this key
    ///
    /// Missing values sort first in ascending order. Values that cannot be
    /// compared with each other are treated as equal so the sort stays stable.
    pub fn compare(&self, a: &dyn Reflect, b: &dyn Reflect) -> Ordering {
        let ordering = match (self.accessor.read(a), self.accessor.read(b)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(left), Some(right)) => left.compare(&right).unwrap_or(Ordering::Equal),
        };

        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Compare two entities on a list of keys, first key first
pub fn compare_by_keys(keys: &[SortKey], a: &dyn Reflect, b: &dyn Reflect) -> Ordering {
    keys.iter()
        .map(|key| key.compare(a, b))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Paging window, only honoured when enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Paging {
    pub skip: usize,
    pub take: usize,
    pub enabled: bool,
}

pub struct Specification<T> {
    criteria: Predicate,
    order_by: Option<FieldAccessor>,
    order_by_descending: Option<FieldAccessor>,
    then_by: Vec<SortKey>,
    includes: Vec<String>,
    paging: Paging,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Reflect> Specification<T> {
    pub fn builder() -> SpecificationBuilder<T> {
        SpecificationBuilder::new()
    }

    /// Compile a wire request into a builder
    ///
    /// Filters and sort keys that fail to resolve are logged and dropped.
    /// The builder can still take includes or more ordering before `build`.
    pub fn from_request(request: &QueryFilterRequest) -> SpecificationBuilder<T> {
        SpecificationBuilder::from_request(request)
    }
}

impl<T> Specification<T> {
    pub fn criteria(&self) -> &Predicate {
        &self.criteria
    }

    pub fn order_by(&self) -> Option<&FieldAccessor> {
        self.order_by.as_ref()
    }

    pub fn order_by_descending(&self) -> Option<&FieldAccessor> {
        self.order_by_descending.as_ref()
    }

    pub fn then_by(&self) -> &[SortKey] {
        &self.then_by
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn paging(&self) -> Paging {
        self.paging
    }

    /// Composite ordering: `order_by` ascending, then `order_by_descending`,
    /// then the `then_by` keys
    pub fn sort_keys(&self) -> Vec<SortKey> {
        let primary = self
            .order_by
            .iter()
            .map(|accessor| SortKey::new(accessor.clone(), SortDirection::Ascending));
        let secondary = self
            .order_by_descending
            .iter()
            .map(|accessor| SortKey::new(accessor.clone(), SortDirection::Descending));

        primary
            .chain(secondary)
            .chain(self.then_by.iter().cloned())
            .collect()
    }

    pub(crate) fn into_parts(self) -> SpecificationParts {
        let sort_keys = self.sort_keys();
        SpecificationParts {
            criteria: self.criteria,
            sort_keys,
            includes: self.includes,
            paging: self.paging,
        }
    }
}

impl<T> fmt::Debug for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("criteria", &self.criteria.to_string())
            .field("order_by", &self.order_by)
            .field("order_by_descending", &self.order_by_descending)
            .field("then_by", &self.then_by)
            .field("includes", &self.includes)
            .field("paging", &self.paging)
            .finish()
    }
}

/// Destructured specification, ready for evaluation
pub(crate) struct SpecificationParts {
    pub criteria: Predicate,
    pub sort_keys: Vec<SortKey>,
    pub includes: Vec<String>,
    pub paging: Paging,
}

pub struct SpecificationBuilder<T> {
    criteria: Predicate,
    order_by: Option<FieldAccessor>,
    order_by_descending: Option<FieldAccessor>,
    then_by: Vec<SortKey>,
    includes: Vec<String>,
    paging: Paging,
    dropped: Vec<SkippedFilter>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Reflect> SpecificationBuilder<T> {
    pub fn new() -> Self {
        Self {
            criteria: Predicate::Always,
            order_by: None,
            order_by_descending: None,
            then_by: Vec::new(),
            includes: Vec::new(),
            paging: Paging::default(),
            dropped: Vec::new(),
            _entity: PhantomData,
        }
    }

    pub fn from_request(request: &QueryFilterRequest) -> Self {
        let entity_type = T::schema().type_name();
        let compiled = FilterCompiler::compile::<T>(&request.filters, request.logic);

        let mut keys = Vec::with_capacity(request.sort.len());
        for descriptor in request.sort_by_priority() {
            match FieldPathResolver::resolve::<T>(&descriptor.target_field) {
                Ok(accessor) => keys.push(SortKey::new(accessor, descriptor.direction)),
                Err(error) => tracing::warn!(
                    entity_type = entity_type,
                    field = %descriptor.target_field,
                    error = %error,
                    "Skipping sort key that failed to resolve"
                ),
            }
        }

        // Relations reached by a filter or sort path must be loaded before
        // the source is filtered.
        let crossed: Vec<&'static str> = compiled
            .predicate
            .accessors()
            .into_iter()
            .chain(keys.iter().map(|key| &key.accessor))
            .filter_map(|accessor| accessor.relations().first().copied())
            .collect();

        let mut builder = Self::new().criteria(compiled.predicate);
        builder.dropped = compiled.skipped;
        for relation in crossed {
            builder = builder.include(relation);
        }

        let mut keys = keys.into_iter();
        if let Some(first) = keys.next() {
            match first.direction {
                SortDirection::Ascending => builder.order_by = Some(first.accessor),
                SortDirection::Descending => builder.order_by_descending = Some(first.accessor),
            }
        }
        builder.then_by.extend(keys);

        if request.paging_enabled() {
            let skip = request.page_index.saturating_mul(request.page_size);
            builder = builder.paging(skip, request.page_size);
        }

        builder
    }

    /// Replace the filter predicate
    pub fn criteria(mut self, predicate: Predicate) -> Self {
        self.criteria = predicate;
        self
    }

    pub fn order_by(mut self, path: &str) -> Result<Self, QueryError> {
        self.order_by = Some(FieldPathResolver::resolve::<T>(path)?);
        Ok(self)
    }

    pub fn order_by_descending(mut self, path: &str) -> Result<Self, QueryError> {
        self.order_by_descending = Some(FieldPathResolver::resolve::<T>(path)?);
        Ok(self)
    }

    pub fn then_by(mut self, path: &str, direction: SortDirection) -> Result<Self, QueryError> {
        let accessor = FieldPathResolver::resolve::<T>(path)?;
        self.then_by.push(SortKey::new(accessor, direction));
        Ok(self)
    }

    /// Declare a relation to eager-load; repeated names are kept once
    pub fn include(mut self, relation: impl Into<String>) -> Self {
        let relation = relation.into();
        if !self
            .includes
            .iter()
            .any(|declared| segment_matches(declared, &relation))
        {
            self.includes.push(relation);
        }
        self
    }

    pub fn paging(mut self, skip: usize, take: usize) -> Self {
        self.paging = Paging {
            skip,
            take,
            enabled: true,
        };
        self
    }

    /// Keep the window values but stop applying them
    pub fn disable_paging(mut self) -> Self {
        self.paging.enabled = false;
        self
    }

    /// Filters dropped while compiling the request
    pub fn dropped_filters(&self) -> &[SkippedFilter] {
        &self.dropped
    }

    /// Fail when the request carried filters but every one was dropped
    pub fn require_any_filter(self) -> Result<Self, QueryError> {
        if self.criteria.is_always() && !self.dropped.is_empty() {
            return Err(QueryError::NoValidFilters {
                dropped: self.dropped.len(),
            });
        }
        Ok(self)
    }

    pub fn build(self) -> Specification<T> {
        Specification {
            criteria: self.criteria,
            order_by: self.order_by,
            order_by_descending: self.order_by_descending,
            then_by: self.then_by,
            includes: self.includes,
            paging: self.paging,
            _entity: PhantomData,
        }
    }
}

impl<T: Reflect> Default for SpecificationBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
