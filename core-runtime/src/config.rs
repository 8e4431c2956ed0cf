//! Client configuration.
//!
//! [`CoreConfig`] describes how the core identifies itself to the media
//! server and how catalog synchronization paginates. Hosts construct it once
//! at startup and hand it to the service container; there is no hidden
//! settings persistence here (that belongs to the host).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of items fetched per page during paginated catalog refreshes.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Core client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Base URL of the media server, e.g. `http://localhost:8096`.
    pub server_url: String,
    /// Account name used for stored-credential login.
    pub username: String,
    /// Client name reported in the authorization header.
    pub client_name: String,
    /// Human-readable device name reported to the server.
    pub device_name: String,
    /// Stable device identifier reported to the server.
    pub device_id: String,
    /// Client version string reported to the server.
    pub client_version: String,
    /// Page size for paginated collection listing.
    pub page_size: u32,
}

impl CoreConfig {
    /// Create a configuration for the given server and account, with
    /// default client identity fields.
    pub fn new(server_url: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            username: username.into(),
            ..Self::default()
        }
    }

    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    pub fn with_device(
        mut self,
        device_name: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Self {
        self.device_name = device_name.into();
        self.device_id = device_id.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Validate the configuration, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.server_url.trim().is_empty() {
            return Err(invalid("server_url", "must not be empty"));
        }
        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            return Err(invalid("server_url", "must be an http(s) URL"));
        }
        if self.username.trim().is_empty() {
            return Err(invalid("username", "must not be empty"));
        }
        if self.device_id.trim().is_empty() {
            return Err(invalid("device_id", "must not be empty"));
        }
        if self.page_size == 0 {
            return Err(invalid("page_size", "must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            username: String::new(),
            client_name: "attune".to_string(),
            device_name: "unknown-device".to_string(),
            // Random per construction. Hosts wanting a stable identity
            // across launches must set their own with `with_device`.
            device_id: uuid::Uuid::new_v4().to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn invalid(field: &str, message: &str) -> Error {
    Error::InvalidConfig {
        field: field.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_config_passes_validation() {
        let config = CoreConfig::new("http://localhost:8096", "admin");
        config.validate().unwrap();
    }

    #[test]
    fn rejects_missing_server_url() {
        let config = CoreConfig::new("", "admin");
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig { field, .. }) if field == "server_url"
        ));
    }

    #[test]
    fn rejects_non_http_server_url() {
        let config = CoreConfig::new("ftp://nope", "admin");
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_page_size() {
        let config = CoreConfig::new("http://localhost:8096", "admin").with_page_size(0);
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig { field, .. }) if field == "page_size"
        ));
    }

    #[test]
    fn serde_round_trip() {
        let config = CoreConfig::new("https://media.example", "listener")
            .with_device("phone", "device-1")
            .with_page_size(25);
        let json = serde_json::to_string(&config).unwrap();
        let back: CoreConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
