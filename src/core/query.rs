//! Filter request and paginated response types
//!
//! These are the wire-level shapes exchanged with API clients. A request is
//! compiled into a [`Specification`](crate::core::specification::Specification)
//! before it touches any data.

use crate::core::operator::{ComparisonOperator, OperatorCode};
use serde::{Deserialize, Serialize};

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: usize = 15;

/// One field/operator/value triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDescriptor {
    /// Dotted field path (e.g. `"Owner.Name"`)
    pub target_field: String,

    pub operator: OperatorCode,

    /// Literal, always sent as a string
    pub value: String,
}

impl FilterDescriptor {
    pub fn new(
        target_field: impl Into<String>,
        operator: ComparisonOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            target_field: target_field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// Connective applied uniformly to every filter of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogicalOperator {
    #[default]
    #[serde(alias = "and", alias = "AND")]
    And,
    #[serde(alias = "or", alias = "OR")]
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(alias = "asc", alias = "ascending")]
    Ascending,
    #[serde(alias = "desc", alias = "descending")]
    Descending,
}

impl SortDirection {
    pub fn is_descending(self) -> bool {
        matches!(self, SortDirection::Descending)
    }
}

/// Sort key of a request; lower `priority` sorts first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortDescriptor {
    pub target_field: String,

    #[serde(default)]
    pub direction: SortDirection,

    #[serde(default)]
    pub priority: i32,
}

impl SortDescriptor {
    pub fn new(target_field: impl Into<String>, direction: SortDirection, priority: i32) -> Self {
        Self {
            target_field: target_field.into(),
            direction,
            priority,
        }
    }
}

/// Filter, sort and paging request for a listing
///
/// # Example
/// ```json
/// {
///   "filters": [{ "targetField": "Price", "operator": "GreaterThan", "value": "500000" }],
///   "sort": [{ "targetField": "Price", "direction": "Descending", "priority": 0 }],
///   "logic": "And",
///   "pageIndex": 0,
///   "pageSize": 15
/// }
/// ```
///
/// A `pageSize` of 0 disables paging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryFilterRequest {
    pub filters: Vec<FilterDescriptor>,

    pub sort: Vec<SortDescriptor>,

    pub logic: LogicalOperator,

    /// Zero-based page number
    pub page_index: usize,

    pub page_size: usize,
}

impl Default for QueryFilterRequest {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sort: Vec::new(),
            logic: LogicalOperator::And,
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryFilterRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(
        mut self,
        target_field: impl Into<String>,
        operator: ComparisonOperator,
        value: impl Into<String>,
    ) -> Self {
        self.filters
            .push(FilterDescriptor::new(target_field, operator, value));
        self
    }

    pub fn sort_by(
        mut self,
        target_field: impl Into<String>,
        direction: SortDirection,
        priority: i32,
    ) -> Self {
        self.sort
            .push(SortDescriptor::new(target_field, direction, priority));
        self
    }

    pub fn logic(mut self, logic: LogicalOperator) -> Self {
        self.logic = logic;
        self
    }

    pub fn page(mut self, page_index: usize, page_size: usize) -> Self {
        self.page_index = page_index;
        self.page_size = page_size;
        self
    }

    pub fn paging_enabled(&self) -> bool {
        self.page_size > 0
    }

    /// Cap the page size; a disabled page size is capped too
    pub fn clamp_page_size(&mut self, max_page_size: usize) {
        if self.page_size == 0 || self.page_size > max_page_size {
            self.page_size = max_page_size;
        }
    }

    /// Sort descriptors ordered by priority (stable for equal priorities)
    pub fn sort_by_priority(&self) -> Vec<&SortDescriptor> {
        let mut sort: Vec<&SortDescriptor> = self.sort.iter().collect();
        sort.sort_by_key(|descriptor| descriptor.priority);
        sort
    }
}

/// Paginated response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// The page of data
    pub data: Vec<T>,

    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Zero-based page number
    pub page_index: usize,

    /// Items per page, 0 when paging is disabled
    pub page_size: usize,

    /// Total number of items (after filters)
    pub total: usize,

    pub total_pages: usize,

    pub has_next: bool,

    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(page_index: usize, page_size: usize, total: usize) -> Self {
        if page_size == 0 {
            return Self {
                page_index: 0,
                page_size,
                total,
                total_pages: usize::from(total > 0),
                has_next: false,
                has_prev: false,
            };
        }

        let total_pages = total.div_ceil(page_size);
        let start = page_index.saturating_mul(page_size);

        Self {
            page_index,
            page_size,
            total,
            total_pages,
            has_next: start.saturating_add(page_size) < total,
            has_prev: page_index > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = QueryFilterRequest::default();
        assert_eq!(request.page_index, 0);
        assert_eq!(request.page_size, 15);
        assert_eq!(request.logic, LogicalOperator::And);
        assert!(request.filters.is_empty());
    }

    #[test]
    fn test_request_from_json_defaults() {
        let request: QueryFilterRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, QueryFilterRequest::default());
    }

    #[test]
    fn test_request_from_json() {
        let request: QueryFilterRequest = serde_json::from_str(
            r#"{
                "filters": [
                    {"targetField": "Price", "operator": "GreaterThan", "value": "500000"},
                    {"targetField": "Name", "operator": 0, "value": "Park"}
                ],
                "sort": [{"targetField": "Price", "direction": "desc"}],
                "logic": "or",
                "pageIndex": 2,
                "pageSize": 5
            }"#,
        )
        .unwrap();

        assert_eq!(request.filters.len(), 2);
        assert_eq!(
            request.filters[0].operator,
            OperatorCode::Name("GreaterThan".into())
        );
        assert_eq!(request.filters[1].operator, OperatorCode::Ordinal(0));
        assert_eq!(request.sort[0].direction, SortDirection::Descending);
        assert_eq!(request.sort[0].priority, 0);
        assert_eq!(request.logic, LogicalOperator::Or);
        assert_eq!(request.page_index, 2);
        assert_eq!(request.page_size, 5);
    }

    #[test]
    fn test_sort_by_priority() {
        let request = QueryFilterRequest::new()
            .sort_by("City", SortDirection::Ascending, 2)
            .sort_by("Price", SortDirection::Descending, 0)
            .sort_by("Name", SortDirection::Ascending, 1);

        let fields: Vec<&str> = request
            .sort_by_priority()
            .iter()
            .map(|s| s.target_field.as_str())
            .collect();
        assert_eq!(fields, vec!["Price", "Name", "City"]);
    }

    #[test]
    fn test_clamp_page_size() {
        let mut request = QueryFilterRequest::new().page(0, 500);
        request.clamp_page_size(100);
        assert_eq!(request.page_size, 100);

        let mut request = QueryFilterRequest::new().page(0, 0);
        request.clamp_page_size(100);
        assert_eq!(request.page_size, 100);

        let mut request = QueryFilterRequest::new().page(0, 10);
        request.clamp_page_size(100);
        assert_eq!(request.page_size, 10);
    }

    #[test]
    fn test_pagination_meta_far_page() {
        let meta = PaginationMeta::new(usize::MAX, 15, 3);
        assert!(meta.has_prev);
        assert!(!meta.has_next);
        assert_eq!(meta.total_pages, 1);
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(0, 20, 145);
        assert_eq!(meta.total, 145);
        assert_eq!(meta.total_pages, 8);
        assert!(!meta.has_prev);
        assert!(meta.has_next);

        let last = PaginationMeta::new(7, 20, 145);
        assert!(last.has_prev);
        assert!(!last.has_next);
    }

    #[test]
    fn test_pagination_meta_disabled() {
        let meta = PaginationMeta::new(0, 0, 12);
        assert_eq!(meta.total_pages, 1);
        assert!(!meta.has_next);

        let empty = PaginationMeta::new(0, 0, 0);
        assert_eq!(empty.total_pages, 0);
    }
}
