//! Authorization strategies and the store that tracks their outcome
//!
//! Every operation calls [`Authorizer::authorize`] first. The password and
//! token strategies exchange credentials on every call. Only the last issued
//! token is kept, for inspection and for the next refresh.

use std::{
    fmt,
    sync::{PoisonError, RwLock},
};

use compact_str::{format_compact, CompactString};
use reqwest::{header::AUTHORIZATION, Method, Url};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::{
    error::{ClientError, Result},
    response::{AuthResponse, Record},
    transport::{endpoint_url, Transport, AUTH_OP},
};

const SUPERUSERS_COLLECTION: &str = "_superusers";
const USERS_COLLECTION: &str = "users";

/// Which auth endpoint family a credential belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthTarget {
    /// `/api/collections/_superusers/...`
    Superusers,
    /// `/api/admins/...` on servers older than 0.23
    LegacyAdmins,
    /// `/api/collections/<name>/...` for any auth collection
    Collection(CompactString),
}

impl AuthTarget {
    /// The default `users` auth collection
    pub fn users() -> Self {
        Self::Collection(USERS_COLLECTION.into())
    }

    pub fn collection(name: impl Into<CompactString>) -> Self {
        Self::Collection(name.into())
    }

    /// Path segments of `action` (`auth-with-password`, `auth-refresh`) for this target
    pub fn segments<'a>(&'a self, action: &'a str) -> Vec<&'a str> {
        match self {
            AuthTarget::Superusers => vec!["api", "collections", SUPERUSERS_COLLECTION, action],
            AuthTarget::LegacyAdmins => vec!["api", "admins", action],
            AuthTarget::Collection(name) => vec!["api", "collections", name.as_str(), action],
        }
    }
}

/// How the client obtains its token
#[derive(Clone, Default)]
pub enum AuthMethod {
    /// Unauthenticated; every authorize succeeds with an empty token
    #[default]
    None,
    /// Exchange identity and password for a token
    Password {
        target: AuthTarget,
        identity: CompactString,
        password: CompactString,
    },
    /// Exchange an existing token for a refreshed one
    Token { target: AuthTarget, token: CompactString },
}

impl AuthMethod {
    pub fn password(target: AuthTarget, identity: &str, password: &str) -> Self {
        Self::Password {
            target,
            identity: identity.into(),
            password: password.into(),
        }
    }

    pub fn token(target: AuthTarget, token: &str) -> Self {
        Self::Token { target, token: token.into() }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            AuthMethod::None => Ok(()),
            AuthMethod::Password { target, identity, .. } => {
                if identity.is_empty() {
                    return Err(ClientError::config_validation("identity", "cannot be empty"));
                }
                target.validate()
            },
            AuthMethod::Token { target, token } => {
                if token.is_empty() {
                    return Err(ClientError::config_validation("token", "cannot be empty"));
                }
                target.validate()
            },
        }
    }
}

impl AuthTarget {
    fn validate(&self) -> Result<()> {
        match self {
            AuthTarget::Collection(name) if name.is_empty() => Err(
                ClientError::config_validation("auth collection", "cannot be empty"),
            ),
            _ => Ok(()),
        }
    }
}

// Secrets stay out of logs and panic messages.
impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::None => write!(f, "None"),
            AuthMethod::Password { target, identity, .. } => f
                .debug_struct("Password")
                .field("target", target)
                .field("identity", identity)
                .field("password", &"***")
                .finish(),
            AuthMethod::Token { target, .. } => f
                .debug_struct("Token")
                .field("target", target)
                .field("token", &"***")
                .finish(),
        }
    }
}

/// Where an authorizer stands after its most recent `authorize()`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Unauthorized,
    Authorizing,
    Authorized,
    Failed,
}

/// Outcome of the latest authorization, readable while requests are in flight
#[derive(Default)]
pub struct AuthStore {
    inner: RwLock<AuthSnapshot>,
}

#[derive(Debug, Clone, Default)]
struct AuthSnapshot {
    state: AuthState,
    token: CompactString,
    record: Option<Record>,
}

impl AuthStore {
    /// Last issued token; empty when unauthenticated or after a failure
    pub fn token(&self) -> CompactString {
        self.read().token
    }

    pub fn state(&self) -> AuthState {
        self.read().state
    }

    /// Auth record echoed by the last successful exchange
    pub fn record(&self) -> Option<Record> {
        self.read().record
    }

    pub fn is_valid(&self) -> bool {
        self.state() == AuthState::Authorized
    }

    fn read(&self) -> AuthSnapshot {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn update(&self, f: impl FnOnce(&mut AuthSnapshot)) {
        let mut snapshot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *snapshot);
    }

    fn begin(&self) {
        self.update(|s| s.state = AuthState::Authorizing);
    }

    fn authorized(&self, token: CompactString, record: Option<Record>) {
        self.update(|s| {
            s.state = AuthState::Authorized;
            s.token = token;
            s.record = record;
        });
    }

    fn failed(&self) {
        self.update(|s| {
            s.state = AuthState::Failed;
            s.token = CompactString::default();
            s.record = None;
        });
    }
}

impl fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.read();
        f.debug_struct("AuthStore")
            .field("state", &snapshot.state)
            .field("has_token", &!snapshot.token.is_empty())
            .finish()
    }
}

#[derive(Serialize)]
struct PasswordRequest<'a> {
    identity: &'a str,
    password: &'a str,
}

/// Runs the configured [`AuthMethod`] and records the result in its [`AuthStore`]
#[derive(Debug)]
pub(crate) struct Authorizer {
    method: AuthMethod,
    store: AuthStore,
}

impl Authorizer {
    pub fn new(method: AuthMethod) -> Self {
        Self { method, store: AuthStore::default() }
    }

    pub fn store(&self) -> &AuthStore {
        &self.store
    }

    /// Obtain a token for the next request. The no-op strategy returns an
    /// empty token without touching the network.
    #[instrument(skip_all, fields(method = %self.kind()))]
    pub async fn authorize(&self, transport: &Transport, base_url: &Url) -> Result<CompactString> {
        let request = match &self.method {
            AuthMethod::None => {
                self.store.authorized(CompactString::default(), None);
                return Ok(CompactString::default());
            },
            AuthMethod::Password { target, identity, password } => {
                let url = endpoint_url(base_url, &target.segments("auth-with-password"));
                let body = serde_json::to_string(&PasswordRequest { identity, password })
                    .map_err(|e| ClientError::authorization(ClientError::encode(AUTH_OP, e)))?;
                transport.request(Method::POST, url).body(body)
            },
            AuthMethod::Token { target, token } => {
                let url = endpoint_url(base_url, &target.segments("auth-refresh"));
                let current = self.current_token(token);
                transport
                    .request(Method::POST, url)
                    .header(AUTHORIZATION, current.as_str())
            },
        };

        self.store.begin();
        let exchanged = match transport.execute(AUTH_OP, request).await {
            Ok(response) => response.json::<AuthResponse>(AUTH_OP),
            Err(e) => Err(e),
        };

        match exchanged {
            Ok(AuthResponse { token, record }) => {
                debug!("Authorization successful");
                self.store.authorized(token.clone(), record);
                Ok(token)
            },
            Err(e) => {
                warn!(error = %e, "Authorization failed");
                self.store.failed();
                Err(ClientError::authorization(e))
            },
        }
    }

    /// Token to present to `auth-refresh`: the latest issued one, or the seed
    fn current_token(&self, seed: &CompactString) -> CompactString {
        let issued = self.store.token();
        if issued.is_empty() {
            seed.clone()
        } else {
            issued
        }
    }

    fn kind(&self) -> CompactString {
        match &self.method {
            AuthMethod::None => "none".into(),
            AuthMethod::Password { target, .. } => format_compact!("password:{}", target.name()),
            AuthMethod::Token { target, .. } => format_compact!("token:{}", target.name()),
        }
    }
}

impl AuthTarget {
    fn name(&self) -> &str {
        match self {
            AuthTarget::Superusers => SUPERUSERS_COLLECTION,
            AuthTarget::LegacyAdmins => "admins",
            AuthTarget::Collection(name) => name.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_segments() {
        assert_eq!(
            AuthTarget::Superusers.segments("auth-with-password"),
            vec!["api", "collections", "_superusers", "auth-with-password"]
        );
        assert_eq!(
            AuthTarget::LegacyAdmins.segments("auth-refresh"),
            vec!["api", "admins", "auth-refresh"]
        );
        assert_eq!(
            AuthTarget::users().segments("auth-refresh"),
            vec!["api", "collections", "users", "auth-refresh"]
        );
    }

    #[test]
    fn test_auth_method_validation() {
        assert!(AuthMethod::None.validate().is_ok());
        assert!(AuthMethod::password(AuthTarget::users(), "a@b.c", "pw").validate().is_ok());
        assert!(AuthMethod::password(AuthTarget::users(), "", "pw").validate().is_err());
        assert!(AuthMethod::token(AuthTarget::Superusers, "").validate().is_err());
        assert!(AuthMethod::token(AuthTarget::collection(""), "tok").validate().is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let method = AuthMethod::password(AuthTarget::Superusers, "admin@example.com", "hunter2");
        let printed = format!("{method:?}");
        assert!(printed.contains("admin@example.com"));
        assert!(!printed.contains("hunter2"));

        let printed = format!("{:?}", AuthMethod::token(AuthTarget::users(), "seed-token"));
        assert!(!printed.contains("seed-token"));
    }

    #[test]
    fn test_store_transitions() {
        let store = AuthStore::default();
        assert_eq!(store.state(), AuthState::Unauthorized);

        store.begin();
        assert_eq!(store.state(), AuthState::Authorizing);

        store.authorized("tok".into(), None);
        assert!(store.is_valid());
        assert_eq!(store.token(), "tok");

        store.failed();
        assert_eq!(store.state(), AuthState::Failed);
        assert!(store.token().is_empty());
    }

    #[test]
    fn test_refresh_uses_latest_token() {
        let authorizer = Authorizer::new(AuthMethod::token(AuthTarget::users(), "seed"));
        assert_eq!(authorizer.current_token(&"seed".into()), "seed");

        authorizer.store.authorized("fresh".into(), None);
        assert_eq!(authorizer.current_token(&"seed".into()), "fresh");
    }
}
