//! Search criteria -> engine query tree.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Number, Value};

use crate::models::EsQuery;

/// Fields the free-text phrase is matched against.
pub const FREE_TEXT_FIELDS: [&str; 3] = ["title", "description.plain_text", "description.html"];

/// Subset of the engine's query DSL used by item search.
///
/// Serializes to the engine's wire shape, e.g.
/// `{"bool": {"filter": [{"term": {"status": "active"}}]}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryTree {
    Bool(BoolQuery),
    MultiMatch(MultiMatchQuery),
    Range(RangeQuery),
    Term(TermQuery),
}

/// Scored `must` clauses plus unscored `filter` clauses, all conjunctive.
///
/// Empty lists are left off the wire; `{"bool": {}}` matches every document.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BoolQuery {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<QueryTree>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<QueryTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiMatchQuery {
    pub query: String,
    pub fields: Vec<String>,
}

/// Inclusive numeric range on one field; either bound may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    pub field: String,
    pub bounds: RangeBounds,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RangeBounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<Number>,
}

/// Exact match on a keyword or numeric field.
#[derive(Debug, Clone, PartialEq)]
pub struct TermQuery {
    pub field: String,
    pub value: Value,
}

impl Serialize for RangeQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.bounds)?;
        map.end()
    }
}

impl Serialize for TermQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.value)?;
        map.end()
    }
}

impl QueryTree {
    pub fn match_all() -> Self {
        QueryTree::Bool(BoolQuery::default())
    }

    fn range(field: &str, gte: Option<Number>, lte: Option<Number>) -> Self {
        QueryTree::Range(RangeQuery {
            field: field.to_string(),
            bounds: RangeBounds { gte, lte },
        })
    }

    fn term(field: &str, value: impl Into<Value>) -> Self {
        QueryTree::Term(TermQuery {
            field: field.to_string(),
            value: value.into(),
        })
    }
}

/// Translate search criteria into a query tree.
///
/// Pure and total: the same criteria always produce the same tree, and
/// pagination is not part of the tree (see [`SearchRequest`]).
pub fn build(query: &EsQuery) -> QueryTree {
    let mut bool_query = BoolQuery::default();

    if let Some(text) = non_empty(&query.search_text) {
        bool_query.must.push(QueryTree::MultiMatch(MultiMatchQuery {
            query: text.to_string(),
            fields: FREE_TEXT_FIELDS.iter().map(|f| f.to_string()).collect(),
        }));
    }

    let min_price = query.min_price.and_then(Number::from_f64);
    let max_price = query.max_price.and_then(Number::from_f64);
    if min_price.is_some() || max_price.is_some() {
        bool_query
            .filter
            .push(QueryTree::range("price", min_price, max_price));
    }

    if let Some(quantity) = query.available_quantity {
        bool_query.filter.push(QueryTree::range(
            "available_quantity",
            Some(Number::from(quantity)),
            None,
        ));
    }

    if let Some(status) = non_empty(&query.status) {
        bool_query.filter.push(QueryTree::term("status", status));
    }

    if let Some(seller) = query.seller {
        bool_query.filter.push(QueryTree::term("seller", seller));
    }

    QueryTree::Bool(bool_query)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Query tree plus pass-through pagination, as sent to `_search`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub query: QueryTree,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
}

impl SearchRequest {
    pub fn new(query: QueryTree) -> Self {
        Self {
            query,
            from: None,
            size: None,
        }
    }
}

impl From<&EsQuery> for SearchRequest {
    fn from(query: &EsQuery) -> Self {
        Self {
            query: build(query),
            from: query.from,
            size: query.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filters(tree: &QueryTree) -> &[QueryTree] {
        match tree {
            QueryTree::Bool(b) => &b.filter,
            other => panic!("expected bool query, got {:?}", other),
        }
    }

    #[test]
    fn test_min_price_and_status() {
        let query = EsQuery {
            min_price: Some(5.0),
            status: Some("active".to_string()),
            ..EsQuery::default()
        };

        let tree = build(&query);
        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({"bool": {"filter": [
                {"range": {"price": {"gte": 5.0}}},
                {"term": {"status": "active"}}
            ]}})
        );

        let ranges: Vec<_> = filters(&tree)
            .iter()
            .filter(|c| matches!(c, QueryTree::Range(_)))
            .collect();
        assert_eq!(ranges.len(), 1);
    }

    #[test]
    fn test_build_is_deterministic() {
        let query = EsQuery {
            min_price: Some(5.0),
            status: Some("active".to_string()),
            ..EsQuery::default()
        };
        let first = build(&query);
        for _ in 0..3 {
            assert_eq!(build(&query), first);
        }
    }

    #[test]
    fn test_empty_query_matches_all() {
        let tree = build(&EsQuery::default());
        assert_eq!(tree, QueryTree::match_all());
        assert_eq!(serde_json::to_value(&tree).unwrap(), json!({"bool": {}}));
    }

    #[test]
    fn test_blank_text_and_status_are_ignored() {
        let query = EsQuery {
            search_text: Some("  ".to_string()),
            status: Some(String::new()),
            ..EsQuery::default()
        };
        assert_eq!(build(&query), QueryTree::match_all());
    }

    #[test]
    fn test_full_criteria() {
        let query = EsQuery {
            search_text: Some("rust book".to_string()),
            status: Some("active".to_string()),
            seller: Some(7),
            min_price: Some(1.5),
            max_price: Some(20.0),
            available_quantity: Some(2),
            from: Some(10),
            size: Some(5),
        };

        assert_eq!(
            serde_json::to_value(SearchRequest::from(&query)).unwrap(),
            json!({
                "query": {"bool": {
                    "must": [{"multi_match": {
                        "query": "rust book",
                        "fields": ["title", "description.plain_text", "description.html"]
                    }}],
                    "filter": [
                        {"range": {"price": {"gte": 1.5, "lte": 20.0}}},
                        {"range": {"available_quantity": {"gte": 2}}},
                        {"term": {"status": "active"}},
                        {"term": {"seller": 7}}
                    ]
                }},
                "from": 10,
                "size": 5
            })
        );
    }

    #[test]
    fn test_one_sided_upper_price_bound() {
        let query = EsQuery {
            max_price: Some(9.99),
            ..EsQuery::default()
        };
        assert_eq!(
            serde_json::to_value(build(&query)).unwrap(),
            json!({"bool": {"filter": [{"range": {"price": {"lte": 9.99}}}]}})
        );
    }

    #[test]
    fn test_pagination_is_omitted_when_absent() {
        let request = SearchRequest::from(&EsQuery::default());
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({"query": {"bool": {}}})
        );
    }
}
