//! Typed async client for PocketBase record collections.
//!
//! ```no_run
//! # async fn run() -> pocketbase_client::Result<()> {
//! use std::sync::Arc;
//!
//! use pocketbase_client::{Client, ClientConfig, ParamsList, Record};
//!
//! let config = ClientConfig::builder()
//!     .base_url("http://localhost:8090")
//!     .admin_email_password("admin@example.com", "secret")
//!     .build()?;
//! let client = Arc::new(Client::new(config)?);
//!
//! let posts = client.collection::<Record>("posts");
//! let all = posts.full_list(&ParamsList::new().with_sort("-created")).await?;
//! println!("{} posts", all.items.len());
//! # Ok(())
//! # }
//! ```

pub mod client;

pub use client::{
    env_is_truthy, AuthMethod, AuthState, AuthStore, AuthTarget, Client, ClientConfig,
    ClientConfigBuilder, ClientError, Collection, DebugConfig, ParamsList, Record, RequestConfig,
    ResponseCreate, ResponseList, Result, RetryPolicy, MAX_PAGE_SIZE, REST_DEBUG_ENV, REST_LOG_TARGET,
    SSE_DEBUG_ENV,
};
