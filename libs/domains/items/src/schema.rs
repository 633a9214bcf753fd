//! Items index definition.

use serde_json::{Value, json};

/// Collection holding item documents.
pub const ITEMS_INDEX: &str = "items";

/// Settings and mappings for [`ITEMS_INDEX`].
///
/// Single shard, no replicas: sized for a single-node cluster.
pub fn item_index_definition() -> Value {
    json!({
        "settings": {
            "index": {
                "number_of_shards": 1,
                "number_of_replicas": 0
            }
        },
        "mappings": {
            "properties": {
                "title": { "type": "text" },
                "description": {
                    "properties": {
                        "plain_text": { "type": "text" },
                        "html": { "type": "text" }
                    }
                },
                "pictures": {
                    "properties": {
                        "id": { "type": "long" },
                        "url": { "type": "keyword" }
                    }
                },
                "seller": { "type": "long" },
                "video": { "type": "keyword" },
                "price": { "type": "float" },
                "available_quantity": { "type": "integer" },
                "sold_quantity": { "type": "integer" },
                "status": { "type": "keyword" },
                "date_created": {
                    "type": "date",
                    "format": "strict_date_optional_time"
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_is_single_node() {
        let def = item_index_definition();
        assert_eq!(def["settings"]["index"]["number_of_shards"], 1);
        assert_eq!(def["settings"]["index"]["number_of_replicas"], 0);
    }

    #[test]
    fn test_exact_match_fields_are_keywords() {
        let props = &item_index_definition()["mappings"]["properties"];
        assert_eq!(props["status"]["type"], "keyword");
        assert_eq!(props["video"]["type"], "keyword");
        assert_eq!(props["pictures"]["properties"]["url"]["type"], "keyword");
        assert_eq!(props["seller"]["type"], "long");
    }
}
