//! Collection queries and the descriptor a paginated cache pages through.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{compare_values, Document};

/// Default page length for a descriptor
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Comparison operator of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl FilterOp {
    /// SQL spelling of the operator
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    fn accepts(&self, ord: Ordering) -> bool {
        match self {
            Self::Eq => ord == Ordering::Equal,
            Self::Lt => ord == Ordering::Less,
            Self::Le => ord != Ordering::Greater,
            Self::Gt => ord == Ordering::Greater,
            Self::Ge => ord != Ordering::Less,
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq => "==",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        };
        f.write_str(s)
    }
}

/// Field predicate applied by the store before documents are returned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    /// True when the document has the field with a same-typed value satisfying the operator.
    pub fn matches(&self, doc: &Document) -> bool {
        doc.get(&self.field)
            .and_then(|stored| compare_values(stored, &self.value))
            .is_some_and(|ord| self.op.accepts(ord))
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

/// Sort key of a query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// A read against one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionQuery {
    pub collection: String,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub order_by: Option<OrderBy>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl CollectionQuery {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Identifies the dataset a paginated cache pages through.
///
/// Sort order is fixed most-recent-first on `order_field`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub path: String,
    pub filters: Vec<Filter>,
    pub order_field: String,
    pub page_size: usize,
}

impl QueryDescriptor {
    pub fn new(path: impl Into<String>, order_field: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            filters: Vec::new(),
            order_field: order_field.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Set the page length; zero is raised to 1.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Whether two descriptors address the same dataset.
    ///
    /// Page size is not part of the dataset identity: changing it re-slices
    /// the cached items instead of fetching them again.
    pub fn same_dataset(&self, other: &Self) -> bool {
        self.path == other.path
            && self.order_field == other.order_field
            && self.filters == other.filters
    }

    /// Full, unpaged store query for this descriptor.
    pub fn to_query(&self) -> CollectionQuery {
        CollectionQuery {
            collection: self.path.clone(),
            filters: self.filters.clone(),
            order_by: Some(OrderBy {
                field: self.order_field.clone(),
                direction: Direction::Desc,
            }),
            limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Fields;
    use serde_json::json;

    fn doc(fields: Value) -> Document {
        let Value::Object(map) = fields else {
            panic!("fields must be an object")
        };
        Document::new("d", map)
    }

    #[test]
    fn range_filters() {
        let d = doc(json!({ "createdAt": "2025-03-15T10:00:00.000Z" }));

        assert!(Filter::new("createdAt", FilterOp::Ge, "2025-03-01T00:00:00.000Z").matches(&d));
        assert!(Filter::new("createdAt", FilterOp::Le, "2025-03-31T23:59:59.999Z").matches(&d));
        assert!(!Filter::new("createdAt", FilterOp::Gt, "2025-03-15T10:00:00.000Z").matches(&d));
        assert!(!Filter::new("createdAt", FilterOp::Lt, "2025-03-01T00:00:00.000Z").matches(&d));
    }

    #[test]
    fn missing_field_or_type_mismatch_never_matches() {
        let d = doc(json!({ "count": 3 }));

        assert!(!Filter::eq("branch", "North").matches(&d));
        assert!(!Filter::eq("count", "3").matches(&d));
        assert!(Filter::eq("count", 3).matches(&d));
        assert!(!Filter::eq("x", Value::Null).matches(&Document::new("e", Fields::new())));
    }

    #[test]
    fn descriptor_identity_uses_deep_equality() {
        let a = QueryDescriptor::new("history", "createdAt")
            .filter(Filter::new("createdAt", FilterOp::Ge, "2025-03-01"));
        let b = QueryDescriptor::new("history", "createdAt")
            .filter(Filter::new("createdAt", FilterOp::Ge, "2025-03-01"))
            .page_size(50);
        let c = QueryDescriptor::new("history", "createdAt")
            .filter(Filter::new("createdAt", FilterOp::Ge, "2025-04-01"));

        assert!(a.same_dataset(&b));
        assert!(!a.same_dataset(&c));
    }

    #[test]
    fn page_size_defaults_and_floor() {
        assert_eq!(QueryDescriptor::new("x", "y").page_size, 20);
        assert_eq!(QueryDescriptor::new("x", "y").page_size(0).page_size, 1);
    }

    #[test]
    fn descriptor_query_is_descending_and_unbounded() {
        let q = QueryDescriptor::new("gymEquipment", "reviewDate")
            .filter(Filter::eq("branch", "North"))
            .to_query();

        assert_eq!(q.collection, "gymEquipment");
        assert_eq!(q.filters.len(), 1);
        assert_eq!(q.order_by.unwrap().direction, Direction::Desc);
        assert_eq!(q.limit, None);
    }

    #[test]
    fn filter_op_spelling() {
        assert_eq!(FilterOp::Ge.to_string(), ">=");
        assert_eq!(FilterOp::Eq.as_sql(), "=");
        assert_eq!(serde_json::to_value(FilterOp::Le).unwrap(), json!("<="));
    }
}
