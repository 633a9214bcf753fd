use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::Validate;

use crate::document::Document;

/// Item entity - one catalog listing, stored as one document in the `items` index
///
/// `id` is the document id; it is never part of the stored body and is
/// always taken from the engine's metadata on read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct Item {
    /// Document id (engine-side `_id`)
    pub id: String,
    /// Client id of the caller that created the item
    pub seller: i64,
    pub title: String,
    pub description: Description,
    pub pictures: Vec<Picture>,
    /// Video reference (URL or media key)
    pub video: Option<String>,
    pub price: f64,
    pub available_quantity: i32,
    pub sold_quantity: i32,
    /// Free-form lifecycle keyword, e.g. `active`
    pub status: String,
    /// Set once on create
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_created: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Description {
    pub plain_text: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Picture {
    pub id: i64,
    pub url: String,
}

/// Stored body of an item.
#[derive(Serialize)]
struct ItemBody<'a> {
    seller: i64,
    title: &'a str,
    description: &'a Description,
    pictures: &'a [Picture],
    video: &'a Option<String>,
    price: f64,
    available_quantity: i32,
    sold_quantity: i32,
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_created: Option<DateTime<Utc>>,
}

impl Item {
    /// Every field except `id`, for create and full replace.
    ///
    /// `video: None` is written as `null` so a replace clears it; an absent
    /// `date_created` is left out so a replace keeps the stored one.
    pub fn to_document(&self) -> Result<Document, serde_json::Error> {
        into_document(&ItemBody {
            seller: self.seller,
            title: &self.title,
            description: &self.description,
            pictures: &self.pictures,
            video: &self.video,
            price: self.price,
            available_quantity: self.available_quantity,
            sold_quantity: self.sold_quantity,
            status: &self.status,
            date_created: self.date_created,
        })
    }

    /// Decode a stored body, taking the id from engine metadata.
    pub fn from_document(id: &str, source: Document) -> Result<Self, serde_json::Error> {
        let mut item: Item = serde_json::from_value(Value::Object(source))?;
        item.id = id.to_string();
        Ok(item)
    }
}

fn into_document<T: Serialize>(value: &T) -> Result<Document, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

/// Optional-presence wrapper for sparse updates.
///
/// A missing key and an explicit `null` both decode to `Absent`, meaning
/// "leave this field alone". A zero value is still `Present`.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Absent,
    Present(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Field::Absent, Field::Present)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Field::from)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Absent => serializer.serialize_none(),
            Field::Present(v) => v.serialize(serializer),
        }
    }
}

/// Sparse update: only present fields are written.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct PartialUpdateItem {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    #[schema(value_type = Option<String>)]
    pub title: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    #[schema(value_type = Option<PartialDescription>)]
    pub description: Field<PartialDescription>,
    /// Replaces the whole list; the engine does not merge arrays
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    #[schema(value_type = Option<Vec<PartialPicture>>)]
    pub pictures: Field<Vec<PartialPicture>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    #[schema(value_type = Option<String>)]
    pub video: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    #[schema(value_type = Option<f64>)]
    pub price: Field<f64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    #[schema(value_type = Option<i32>)]
    pub available_quantity: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    #[schema(value_type = Option<i32>)]
    pub sold_quantity: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    #[schema(value_type = Option<String>)]
    pub status: Field<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct PartialDescription {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    #[schema(value_type = Option<String>)]
    pub plain_text: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    #[schema(value_type = Option<String>)]
    pub html: Field<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct PartialPicture {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    #[schema(value_type = Option<i64>)]
    pub id: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    #[schema(value_type = Option<String>)]
    pub url: Field<String>,
}

impl PartialUpdateItem {
    /// True when no field is present; applying it changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_absent()
            && self.description.is_absent()
            && self.pictures.is_absent()
            && self.video.is_absent()
            && self.price.is_absent()
            && self.available_quantity.is_absent()
            && self.sold_quantity.is_absent()
            && self.status.is_absent()
    }

    /// Merge-patch body holding only the present fields, nested objects included.
    pub fn to_document(&self) -> Result<Document, serde_json::Error> {
        into_document(self)
    }
}

/// Search criteria; every field is optional and an empty query matches all items.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct EsQuery {
    /// Relevance match against title and description
    pub search_text: Option<String>,
    /// Exact status
    pub status: Option<String>,
    /// Exact seller id
    pub seller: Option<i64>,
    /// Inclusive lower price bound
    pub min_price: Option<f64>,
    /// Inclusive upper price bound
    pub max_price: Option<f64>,
    /// Minimum available quantity (inclusive)
    pub available_quantity: Option<i32>,
    /// Offset into the result set
    #[validate(range(min = 0))]
    pub from: Option<i64>,
    /// Page size
    #[validate(range(min = 0))]
    pub size: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Item {
        Item {
            id: "42".to_string(),
            seller: 7,
            title: "Go in Action".to_string(),
            description: Description {
                plain_text: "A book".to_string(),
                html: "<p>A book</p>".to_string(),
            },
            pictures: vec![Picture {
                id: 1,
                url: "https://img/1.png".to_string(),
            }],
            video: None,
            price: 19.99,
            available_quantity: 3,
            sold_quantity: 0,
            status: "active".to_string(),
            date_created: None,
        }
    }

    #[test]
    fn test_item_document_excludes_id() {
        let doc = sample().to_document().unwrap();
        assert!(!doc.contains_key("id"));
        assert_eq!(doc["seller"], json!(7));
        assert_eq!(doc["description"]["html"], json!("<p>A book</p>"));
        assert_eq!(doc["video"], Value::Null);
        assert!(!doc.contains_key("date_created"));
    }

    #[test]
    fn test_from_document_forces_engine_id() {
        let mut doc = sample().to_document().unwrap();
        doc.insert("id".to_string(), json!("stale"));

        let item = Item::from_document("42", doc).unwrap();
        assert_eq!(item, sample());
    }

    #[test]
    fn test_from_document_tolerates_missing_fields() {
        let mut doc = Map::new();
        doc.insert("title".to_string(), json!("A"));
        let item = Item::from_document("x", doc).unwrap();
        assert_eq!(item.title, "A");
        assert_eq!(item.price, 0.0);
        assert!(item.pictures.is_empty());
    }

    #[test]
    fn test_from_document_rejects_wrong_types() {
        let mut doc = Map::new();
        doc.insert("price".to_string(), json!("cheap"));
        assert!(Item::from_document("x", doc).is_err());
    }

    #[test]
    fn test_field_null_and_missing_are_absent() {
        let patch: PartialUpdateItem =
            serde_json::from_value(json!({"title": null, "price": 0.0})).unwrap();
        assert!(patch.title.is_absent());
        assert_eq!(patch.price, Field::Present(0.0));
        assert!(patch.status.is_absent());
    }

    #[test]
    fn test_empty_patch() {
        let patch: PartialUpdateItem = serde_json::from_value(json!({})).unwrap();
        assert!(patch.is_empty());
        assert!(patch.to_document().unwrap().is_empty());
    }

    #[test]
    fn test_patch_document_is_sparse_at_every_level() {
        let patch: PartialUpdateItem = serde_json::from_value(json!({
            "price": 12.5,
            "description": {"html": "<b>new</b>"},
            "pictures": [{"url": "https://img/2.png"}]
        }))
        .unwrap();

        let doc = patch.to_document().unwrap();
        assert_eq!(
            Value::Object(doc),
            json!({
                "price": 12.5,
                "description": {"html": "<b>new</b>"},
                "pictures": [{"url": "https://img/2.png"}]
            })
        );
    }

    #[test]
    fn test_query_pagination_must_not_be_negative() {
        let query = EsQuery {
            from: Some(-1),
            ..EsQuery::default()
        };
        assert!(query.validate().is_err());

        let query = EsQuery {
            from: Some(0),
            size: Some(10),
            ..EsQuery::default()
        };
        assert!(query.validate().is_ok());
    }
}
