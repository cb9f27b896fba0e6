//! Configuration management for the PocketBase client

use std::time::Duration;

use compact_str::CompactString;

use super::{
    auth::{AuthMethod, AuthTarget},
    error::{ClientError, Result},
};

/// Environment variable that turns on REST request/response logging
pub const REST_DEBUG_ENV: &str = "REST_DEBUG";
/// Environment variable that turns on realtime (SSE) debug logging
pub const SSE_DEBUG_ENV: &str = "SSE_DEBUG";
/// Tracing target of the REST request/response events
pub const REST_LOG_TARGET: &str = "pocketbase_client::rest";

/// Main configuration for the PocketBase client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// PocketBase instance base URL, without trailing slash
    pub base_url: CompactString,
    /// How the client obtains its auth token
    pub auth: AuthMethod,
    /// Request configuration
    pub request: RequestConfig,
    /// Debug configuration
    pub debug: DebugConfig,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Request timeout, the only deadline an in-flight operation has
    pub timeout: Duration,
    /// Retry policy for transport-level failures
    pub retry: RetryPolicy,
}

/// Retry policy applied to requests that fail before a response arrives.
///
/// Waits start at `wait` and double on every attempt, never exceeding `max_wait`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt
    pub count: u32,
    pub wait: Duration,
    pub max_wait: Duration,
}

/// Debug and logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugConfig {
    /// Log every REST request and response body
    pub rest: bool,
    /// Realtime debug flag; carried for callers driving their own SSE client
    pub sse: bool,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            count: 3,
            wait: Duration::from_secs(3),
            max_wait: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn new(count: u32, wait: Duration, max_wait: Duration) -> Self {
        Self { count, wait, max_wait }
    }

    /// Backoff before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.wait.saturating_mul(factor).min(self.max_wait)
    }
}

impl DebugConfig {
    /// Turn flags on for every designated environment variable that `is_truthy`
    /// accepts. Flags already on stay on.
    pub fn with_env_overrides(mut self, is_truthy: impl Fn(&str) -> bool) -> Self {
        self.rest |= is_truthy(REST_DEBUG_ENV);
        self.sse |= is_truthy(SSE_DEBUG_ENV);
        self
    }
}

/// Checks if an environment variable is set to `1`, `true` or `yes`, ignoring case
pub fn env_is_truthy(key: &str) -> bool {
    std::env::var(key)
        .map(|value| is_truthy(&value))
        .unwrap_or(false)
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

impl ClientConfig {
    /// Create a new unauthenticated client configuration, applying
    /// `REST_DEBUG` / `SSE_DEBUG` from the process environment
    pub fn new(base_url: impl Into<CompactString>) -> Self {
        Self::new_with_env(base_url, env_is_truthy)
    }

    /// Like [`ClientConfig::new`], using `is_truthy` in place of the process environment
    pub fn new_with_env(base_url: impl Into<CompactString>, is_truthy: impl Fn(&str) -> bool) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            auth: AuthMethod::None,
            request: RequestConfig::default(),
            debug: DebugConfig::default().with_env_overrides(is_truthy),
        }
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(ClientError::config("Base URL cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ClientError::config("Base URL must start with http:// or https://"));
        }

        if let Err(e) = reqwest::Url::parse(&self.base_url) {
            return Err(ClientError::config_validation("base_url", e.to_string()));
        }

        if self.request.timeout.is_zero() {
            return Err(ClientError::config("Timeout must be greater than zero"));
        }

        if self.request.retry.max_wait < self.request.retry.wait {
            return Err(ClientError::config_validation(
                "retry",
                "max wait time must not be shorter than the initial wait time",
            ));
        }

        self.auth.validate()
    }
}

impl ClientConfig {
    /// Set the authorization method
    pub fn with_auth(mut self, auth: AuthMethod) -> Self {
        self.auth = auth;
        self
    }

    /// Set request configuration
    pub fn with_request(mut self, request: RequestConfig) -> Self {
        self.request = request;
        self
    }

    /// Set debug configuration
    pub fn with_debug(mut self, debug: DebugConfig) -> Self {
        self.debug = debug;
        self
    }
}

fn normalize_base_url(url: CompactString) -> CompactString {
    url.trim_end_matches('/').into()
}

/// Builder for ClientConfig.
///
/// Setters apply in call order; calling the same kind of setter twice keeps
/// the last value. This holds across auth setters too: the last auth method
/// chosen wins.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<CompactString>,
    auth: Option<AuthMethod>,
    request: Option<RequestConfig>,
    debug: Option<DebugConfig>,
}

impl ClientConfigBuilder {
    /// Set base URL
    pub fn base_url(mut self, url: impl Into<CompactString>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the authorization method directly
    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Authenticate as a superuser with email and password
    pub fn admin_email_password(self, email: &str, password: &str) -> Self {
        self.auth(AuthMethod::password(AuthTarget::Superusers, email, password))
    }

    /// Authenticate as an admin against pre-0.23 servers (`/api/admins`)
    pub fn admin_email_password_legacy(self, email: &str, password: &str) -> Self {
        self.auth(AuthMethod::password(AuthTarget::LegacyAdmins, email, password))
    }

    /// Authenticate as a record of the `users` collection
    pub fn user_email_password(self, email: &str, password: &str) -> Self {
        self.auth(AuthMethod::password(AuthTarget::users(), email, password))
    }

    /// Authenticate as a record of an arbitrary auth collection
    pub fn user_email_password_in(self, collection: &str, email: &str, password: &str) -> Self {
        self.auth(AuthMethod::password(AuthTarget::collection(collection), email, password))
    }

    /// Refresh a superuser token
    pub fn admin_token(self, token: &str) -> Self {
        self.auth(AuthMethod::token(AuthTarget::Superusers, token))
    }

    /// Refresh an admin token against pre-0.23 servers
    pub fn admin_token_legacy(self, token: &str) -> Self {
        self.auth(AuthMethod::token(AuthTarget::LegacyAdmins, token))
    }

    /// Refresh a token issued to a `users` record
    pub fn user_token(self, token: &str) -> Self {
        self.auth(AuthMethod::token(AuthTarget::users(), token))
    }

    /// Set request configuration
    pub fn request(mut self, request: RequestConfig) -> Self {
        self.request = Some(request);
        self
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let mut request = self.request.unwrap_or_default();
        request.timeout = timeout;
        self.request = Some(request);
        self
    }

    /// Set retry policy (defaults: count=3, wait=3s, max_wait=10s)
    pub fn retry(mut self, count: u32, wait: Duration, max_wait: Duration) -> Self {
        let mut request = self.request.unwrap_or_default();
        request.retry = RetryPolicy::new(count, wait, max_wait);
        self.request = Some(request);
        self
    }

    /// Enable REST debug logging
    pub fn rest_debug(mut self, enabled: bool) -> Self {
        let mut debug = self.debug.unwrap_or_default();
        debug.rest = enabled;
        self.debug = Some(debug);
        self
    }

    /// Enable realtime debug logging
    pub fn sse_debug(mut self, enabled: bool) -> Self {
        let mut debug = self.debug.unwrap_or_default();
        debug.sse = enabled;
        self.debug = Some(debug);
        self
    }

    /// Build the configuration, applying `REST_DEBUG` / `SSE_DEBUG` from the
    /// process environment as it is right now
    pub fn build(self) -> Result<ClientConfig> {
        self.build_with_env(env_is_truthy)
    }

    /// Build the configuration using `is_truthy` in place of the process environment
    pub fn build_with_env(self, is_truthy: impl Fn(&str) -> bool) -> Result<ClientConfig> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::config("Base URL is required"))?;

        let config = ClientConfig {
            base_url: normalize_base_url(base_url),
            auth: self.auth.unwrap_or_default(),
            request: self.request.unwrap_or_default(),
            debug: self.debug.unwrap_or_default().with_env_overrides(is_truthy),
        };

        config.validate()?;
        Ok(config)
    }
}
