use std::path::{Path, PathBuf};

use directories::BaseDirs;
use pocketbase_client::{AuthMethod, AuthTarget};
use serde::{Deserialize, Serialize};

/// Persistent defaults for `pbq`, stored as TOML
#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PbqConfig {
    /// Base URL of the PocketBase instance
    pub url: String,
    /// Email or username to authenticate with
    pub identity: Option<String>,
    pub password: Option<String>,
    /// Token to refresh instead of a password exchange
    pub token: Option<String>,
    /// `_superusers` (default), `admins` for pre-0.23 servers, or an auth collection
    pub auth_collection: Option<String>,
    pub log_level: Option<String>,
}

impl PbqConfig {
    pub fn auth_method(&self) -> AuthMethod {
        let target = self.auth_target();
        match (&self.token, &self.identity, &self.password) {
            (Some(token), _, _) => AuthMethod::token(target, token),
            (None, Some(identity), Some(password)) => AuthMethod::password(target, identity, password),
            _ => AuthMethod::None,
        }
    }

    fn auth_target(&self) -> AuthTarget {
        match self.auth_collection.as_deref() {
            None | Some("") | Some("_superusers") => AuthTarget::Superusers,
            Some("admins") => AuthTarget::LegacyAdmins,
            Some(name) => AuthTarget::collection(name),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    if let Some(dirs) = BaseDirs::new() {
        dirs.config_dir().join("pbq.toml")
    } else {
        PathBuf::from("pbq.toml")
    }
}

pub fn load_config(config_file: &Path) -> Result<PbqConfig, confy::ConfyError> {
    if config_file.exists() {
        confy::load_path(config_file)
    } else {
        Ok(PbqConfig::default())
    }
}

pub fn save_config(config_file: &Path, config: &PbqConfig) -> Result<(), confy::ConfyError> {
    confy::store_path(config_file, config)
}
