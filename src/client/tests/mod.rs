//! Test utilities and common fixtures for client modules

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::{config::ClientConfigBuilder, ClientConfig};


/// Typed record used by the collection tests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub views: u32,
}

/// JSON of a stored post record
pub fn post_json(id: &str, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "collectionId": "pbc_posts",
        "collectionName": "posts",
        "title": title,
        "views": 3,
        "created": "2024-01-01 00:00:00.000Z",
        "updated": "2024-01-01 00:00:00.000Z"
    })
}

/// JSON of one page of a listing
pub fn page_json(
    page: u32,
    per_page: u32,
    total_items: u32,
    total_pages: u32,
    items: Vec<serde_json::Value>,
) -> serde_json::Value {
    json!({
        "page": page,
        "perPage": per_page,
        "totalItems": total_items,
        "totalPages": total_pages,
        "items": items
    })
}

/// JSON returned by `auth-with-password` and `auth-refresh`
pub fn auth_json(token: &str) -> serde_json::Value {
    json!({
        "token": token,
        "record": {
            "id": "su_1",
            "email": "admin@example.com"
        }
    })
}

/// PocketBase API error body
pub fn pocketbase_error(status: u16, message: &str) -> serde_json::Value {
    json!({
        "status": status,
        "message": message,
        "data": {}
    })
}

/// Mock HTTP server for testing
pub struct MockServer {
    pub server: wiremock::MockServer,
}

impl MockServer {
    /// Start a new mock server
    pub async fn start() -> Self {
        let server = wiremock::MockServer::start().await;
        Self { server }
    }

    /// Get the base URL of the mock server
    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    /// Builder pointing at this server, with fast retries and the process
    /// environment ignored
    pub fn builder(&self) -> ClientConfigBuilder {
        ClientConfig::builder()
            .base_url(self.base_url())
            .timeout(Duration::from_secs(5))
            .retry(0, Duration::from_millis(10), Duration::from_millis(10))
    }

    /// Unauthenticated client config pointing to this server
    pub fn test_config(&self) -> ClientConfig {
        self.builder().build_with_env(|_| false).unwrap()
    }

    /// Requests received so far, in arrival order
    pub async fn requests(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_shapes() {
        let page = page_json(1, 500, 1, 1, vec![post_json("a", "hello")]);
        assert_eq!(page["perPage"], 500);
        assert_eq!(page["items"][0]["title"], "hello");

        assert_eq!(auth_json("tok")["token"], "tok");
        assert_eq!(pocketbase_error(404, "missing")["status"], 404);
    }

    #[test]
    fn test_post_skips_id_when_serialized() {
        let post = Post { id: "a".into(), title: "t".into(), views: 1 };
        let value = serde_json::to_value(&post).unwrap();
        assert!(value.get("id").is_none());
    }
}
