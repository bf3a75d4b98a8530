//! Queryable source abstraction

use crate::core::predicate::Predicate;
use crate::core::reflect::Reflect;
use crate::core::specification::{SortKey, compare_by_keys};

/// A sequence of entities that query steps can be applied to
///
/// Each step consumes the source and returns the transformed source, so a
/// backend can either act eagerly (as [`InMemoryQuery`] does) or accumulate
/// the steps and execute them later.
pub trait Queryable<T>: Sized {
    /// Keep only the entities matching the predicate
    fn filter(self, predicate: &Predicate) -> Self;

    /// Stable sort on a composite key, first key first
    fn order_by(self, keys: &[SortKey]) -> Self;

    fn skip(self, count: usize) -> Self;

    fn take(self, count: usize) -> Self;

    /// Eager-load a relation
    fn include(self, relation: &str) -> Self;

    /// Number of entities currently in the sequence
    fn count(&self) -> usize;

    fn into_vec(self) -> Vec<T>;
}

/// Vec-backed queryable used for snapshots and in-memory stores
///
/// Relations are loaded by the data source before the sequence is built
/// (see [`InMemoryRepository`](crate::storage::InMemoryRepository)), so
/// `include` only records which relations were requested.
#[derive(Debug, Clone)]
pub struct InMemoryQuery<T> {
    items: Vec<T>,
    includes: Vec<String>,
}

impl<T> InMemoryQuery<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            includes: Vec::new(),
        }
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T> From<Vec<T>> for InMemoryQuery<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T: Reflect> Queryable<T> for InMemoryQuery<T> {
    fn filter(mut self, predicate: &Predicate) -> Self {
        self.items.retain(|item| predicate.matches(item));
        self
    }

    fn order_by(mut self, keys: &[SortKey]) -> Self {
        self.items.sort_by(|a, b| compare_by_keys(keys, a, b));
        self
    }

    fn skip(mut self, count: usize) -> Self {
        let count = count.min(self.items.len());
        self.items.drain(..count);
        self
    }

    fn take(mut self, count: usize) -> Self {
        self.items.truncate(count);
        self
    }

    fn include(mut self, relation: &str) -> Self {
        self.includes.push(relation.to_string());
        self
    }

    fn count(&self) -> usize {
        self.items.len()
    }

    fn into_vec(self) -> Vec<T> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::SortDirection;
    use crate::core::resolver::FieldPathResolver;
    use crate::entities::Property;

    fn priced(prices: &[f64]) -> InMemoryQuery<Property> {
        prices
            .iter()
            .map(|price| Property::new(format!("p{}", price), "a", "b", *price, 1))
            .collect::<Vec<_>>()
            .into()
    }

    fn prices(query: InMemoryQuery<Property>) -> Vec<f64> {
        query.into_vec().into_iter().map(|p| p.price).collect()
    }

    #[test]
    fn test_skip_take() {
        let query = priced(&[1.0, 2.0, 3.0, 4.0]).skip(1).take(2);
        assert_eq!(prices(query), vec![2.0, 3.0]);
    }

    #[test]
    fn test_skip_past_end() {
        let query = priced(&[1.0, 2.0]).skip(5);
        assert_eq!(query.count(), 0);
    }

    #[test]
    fn test_order_by_desc() {
        let key = SortKey::new(
            FieldPathResolver::resolve::<Property>("Price").unwrap(),
            SortDirection::Descending,
        );
        let query = priced(&[2.0, 5.0, 1.0]).order_by(&[key]);
        assert_eq!(prices(query), vec![5.0, 2.0, 1.0]);
    }

    #[test]
    fn test_include_is_recorded() {
        let query = priced(&[1.0]).include("owner");
        assert_eq!(query.includes(), &["owner".to_string()]);
        assert_eq!(query.count(), 1);
    }
}
