//! PocketBase client modules
//!
//! The client is split into focused components: configuration, transport
//! with retries, authorization strategies, the untyped request pipeline,
//! the typed collection facade and the page walk.

pub mod api;
pub mod auth;
pub mod collection;
pub mod config;
pub mod error;
pub mod pagination;
pub mod params;
pub mod response;
mod transport;

#[cfg(test)]
mod tests;

// Re-export main types for convenience
pub use api::Client;
pub use auth::{AuthMethod, AuthState, AuthStore, AuthTarget};
pub use collection::Collection;
pub use config::{
    env_is_truthy, ClientConfig, ClientConfigBuilder, DebugConfig, RequestConfig, RetryPolicy,
    REST_DEBUG_ENV, REST_LOG_TARGET, SSE_DEBUG_ENV,
};
pub use error::ClientError;
pub use pagination::MAX_PAGE_SIZE;
pub use params::ParamsList;
pub use response::{Record, ResponseCreate, ResponseList};

pub type Result<T> = std::result::Result<T, ClientError>;
