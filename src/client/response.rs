//! Response envelopes returned by PocketBase

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// An open record shape: whatever fields the server sent
pub type Record = serde_json::Map<String, serde_json::Value>;

/// One page of a record listing. `items` keeps the order the server returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseList<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Default for ResponseList<T> {
    fn default() -> Self {
        Self {
            page: 0,
            per_page: 0,
            total_items: 0,
            total_pages: 0,
            items: Vec::new(),
        }
    }
}

/// Identity and echoed fields of a newly created record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResponseCreate {
    pub id: CompactString,
    pub collection_id: CompactString,
    pub collection_name: CompactString,
    pub created: CompactString,
    pub updated: CompactString,
    pub field: CompactString,
}

/// Body of a successful `auth-with-password` or `auth-refresh` call
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AuthResponse {
    pub token: CompactString,
    #[serde(default)]
    pub record: Option<Record>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_list_envelope_decoding() {
        let list: ResponseList<Record> = serde_json::from_value(json!({
            "page": 2,
            "perPage": 30,
            "totalItems": 31,
            "totalPages": 2,
            "items": [{"id": "b"}]
        }))
        .unwrap();

        assert_eq!(list.page, 2);
        assert_eq!(list.per_page, 30);
        assert_eq!(list.total_items, 31);
        assert_eq!(list.total_pages, 2);
        assert_eq!(list.items[0]["id"], "b");
    }

    #[test]
    fn test_create_ignores_unknown_and_defaults_missing() {
        let created: ResponseCreate = serde_json::from_value(json!({
            "id": "abc123",
            "field": "test",
            "somethingElse": 42
        }))
        .unwrap();

        assert_eq!(created.id, "abc123");
        assert_eq!(created.field, "test");
        assert!(created.created.is_empty());
    }
}
