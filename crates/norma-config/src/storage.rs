//! Content-addressed object store configuration.

use serde::{Deserialize, Serialize};

fn default_storage_root() -> String {
    String::from("./.norma/store")
}

fn default_db_path() -> String {
    String::from("./.norma/norma.db")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Filesystem root the content-addressed object store writes under.
    #[serde(default = "default_storage_root")]
    pub storage_root: String,

    /// Local libSQL database file. `:memory:` is accepted for tests.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Remote libSQL URL for a synced embedded replica. Unset means local-only.
    #[serde(default)]
    pub db_remote_url: Option<String>,

    /// Auth token for `db_remote_url`, if set.
    #[serde(default)]
    pub db_auth_token: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_root: default_storage_root(),
            db_path: default_db_path(),
            db_remote_url: None,
            db_auth_token: None,
        }
    }
}

impl StorageConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.storage_root.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = StorageConfig::default();
        assert!(config.is_configured());
        assert_eq!(config.storage_root, "./.norma/store");
    }
}
