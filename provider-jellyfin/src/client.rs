//! HTTP plumbing shared by every Jellyfin service binding.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

use bridge_traits::SecureStore;
use core_library::{LibraryError, Result, Session};
use core_runtime::CoreConfig;

use crate::dto::AuthenticationResult;

const USER_AGENT: &str = concat!("attune/", env!("CARGO_PKG_VERSION"));

/// Live session established with the server.
#[derive(Debug, Clone)]
pub(crate) struct ActiveSession {
    pub access_token: String,
    pub user_id: String,
}

/// One authenticated connection to a Jellyfin server.
///
/// Implements every remote service contract, so a single shared instance
/// backs all repositories. The session token is established lazily on the
/// first call that needs it and reused afterwards.
pub struct JellyfinClient {
    http: Client,
    base_url: Url,
    config: CoreConfig,
    secrets: Arc<dyn SecureStore>,
    session: RwLock<Option<ActiveSession>>,
}

impl JellyfinClient {
    pub fn new(config: CoreConfig, secrets: Arc<dyn SecureStore>) -> Result<Self> {
        let base_url = parse_base_url(&config.server_url)?;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| LibraryError::Network(err.to_string()))?;
        Ok(Self {
            http,
            base_url,
            config,
            secrets,
            session: RwLock::new(None),
        })
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn device_id(&self) -> &str {
        &self.config.device_id
    }

    /// `Authorization` header value in the MediaBrowser scheme.
    pub(crate) fn authorization_header(&self, token: Option<&str>) -> String {
        let parts = [
            format!("Token=\"{}\"", token.unwrap_or("")),
            format!("Client=\"{}\"", self.config.client_name),
            format!("Device=\"{}\"", self.config.device_name),
            format!("DeviceId=\"{}\"", self.config.device_id),
            format!("Version=\"{}\"", self.config.client_version),
        ];
        format!("Mediabrowser {}", parts.join(", "))
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| LibraryError::Network(format!("invalid endpoint {path}: {err}")))
    }

    /// Returns the live session, logging in with the stored password when
    /// none is held. Concurrent callers race for the write lock; the loser
    /// reuses the winner's session.
    pub(crate) async fn ensure_session(&self) -> Result<ActiveSession> {
        if let Some(session) = self.session.read().await.clone() {
            return Ok(session);
        }

        let mut guard = self.session.write().await;
        if let Some(session) = guard.clone() {
            return Ok(session);
        }

        let secret_key = secret_key(&self.config.username, &self.config.server_url);
        let password = self
            .secrets
            .get_secret(&secret_key)
            .await?
            .ok_or_else(|| LibraryError::Auth("no stored password for this account".into()))?;

        debug!(username = %self.config.username, "logging in");
        let body = serde_json::json!({
            "Username": self.config.username,
            "Pw": password,
        });
        let response = self
            .http
            .post(self.endpoint("Users/AuthenticateByName")?)
            .header(AUTHORIZATION, self.authorization_header(None))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    LibraryError::Auth("server rejected credentials".into())
                }
                _ => status_error(status, None),
            });
        }

        let auth: AuthenticationResult = response.json().await.map_err(decode)?;
        let user_id = auth.user.map(|user| user.id).unwrap_or_default();
        let access_token = auth.access_token.unwrap_or_default();
        if user_id.is_empty() || access_token.is_empty() {
            return Err(LibraryError::Auth("login returned no usable session".into()));
        }

        info!(user_id, "session established");
        let session = ActiveSession {
            access_token,
            user_id,
        };
        *guard = Some(session.clone());
        Ok(session)
    }

    /// Authenticated GET returning a decoded JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        not_found: Option<(&'static str, &str)>,
    ) -> Result<T> {
        let session = self.ensure_session().await?;
        let response = self
            .http
            .get(self.endpoint(path)?)
            .header(
                AUTHORIZATION,
                self.authorization_header(Some(&session.access_token)),
            )
            .query(query)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, not_found));
        }
        response.json().await.map_err(decode)
    }

    /// Authenticated request with no body in either direction.
    pub(crate) async fn send_no_body(
        &self,
        method: Method,
        path: &str,
        not_found: Option<(&'static str, &str)>,
    ) -> Result<()> {
        let session = self.ensure_session().await?;
        let response = self
            .http
            .request(method, self.endpoint(path)?)
            .header(
                AUTHORIZATION,
                self.authorization_header(Some(&session.access_token)),
            )
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, not_found));
        }
        Ok(())
    }

    /// Unauthenticated GET for the public system endpoints.
    pub(crate) async fn get_public(&self, path: &str) -> Result<reqwest::Response> {
        self.http
            .get(self.endpoint(path)?)
            .send()
            .await
            .map_err(transport)
    }
}

#[async_trait]
impl Session for JellyfinClient {
    async fn authenticate(&self) -> Result<String> {
        Ok(self.ensure_session().await?.user_id)
    }
}

/// Key under which the account password lives in the secure store.
pub fn secret_key(username: &str, server_url: &str) -> String {
    format!("{username}@{server_url}")
}

fn parse_base_url(server_url: &str) -> Result<Url> {
    let normalized = if server_url.ends_with('/') {
        server_url.to_string()
    } else {
        format!("{server_url}/")
    };
    Url::parse(&normalized)
        .map_err(|err| LibraryError::Network(format!("invalid server URL: {err}")))
}

pub(crate) fn transport(err: reqwest::Error) -> LibraryError {
    LibraryError::Network(err.to_string())
}

pub(crate) fn decode(err: reqwest::Error) -> LibraryError {
    LibraryError::Network(format!("unexpected response body: {err}"))
}

pub(crate) fn status_error(
    status: StatusCode,
    not_found: Option<(&'static str, &str)>,
) -> LibraryError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            LibraryError::Auth(format!("server rejected request: {status}"))
        }
        StatusCode::NOT_FOUND => match not_found {
            Some((entity, id)) => LibraryError::not_found(entity, id),
            None => LibraryError::Network("server returned 404".into()),
        },
        _ => LibraryError::Network(format!("server returned {status}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeSecrets(Mutex<HashMap<String, String>>);

    #[async_trait]
    impl SecureStore for FakeSecrets {
        async fn set_secret(&self, key: &str, value: &str) -> bridge_traits::error::Result<()> {
            self.0.lock().unwrap().insert(key.into(), value.into());
            Ok(())
        }

        async fn get_secret(&self, key: &str) -> bridge_traits::error::Result<Option<String>> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        async fn delete_secret(&self, key: &str) -> bridge_traits::error::Result<()> {
            self.0.lock().unwrap().remove(key);
            Ok(())
        }
    }

    fn client() -> JellyfinClient {
        let config = CoreConfig::new("https://music.example.org", "alice")
            .with_client_name("attune")
            .with_device("Test Box", "device-1");
        JellyfinClient::new(config, Arc::new(FakeSecrets(Mutex::new(HashMap::new())))).unwrap()
    }

    #[test]
    fn authorization_header_uses_mediabrowser_scheme() {
        let client = client();
        let header = client.authorization_header(Some("tok-123"));
        assert!(header.starts_with("Mediabrowser "));
        assert!(header.contains("Token=\"tok-123\""));
        assert!(header.contains("Client=\"attune\""));
        assert!(header.contains("Device=\"Test Box\""));
        assert!(header.contains("DeviceId=\"device-1\""));

        let anonymous = client.authorization_header(None);
        assert!(anonymous.contains("Token=\"\""));
    }

    #[test]
    fn endpoints_join_regardless_of_trailing_slash() {
        let url = parse_base_url("https://music.example.org").unwrap();
        assert_eq!(
            url.join("System/Ping").unwrap().as_str(),
            "https://music.example.org/System/Ping"
        );

        let url = parse_base_url("https://music.example.org/jellyfin/").unwrap();
        assert_eq!(
            url.join("System/Ping").unwrap().as_str(),
            "https://music.example.org/jellyfin/System/Ping"
        );
    }

    #[test]
    fn bad_server_url_is_rejected() {
        let config = CoreConfig::new("not a url", "alice");
        let store: Arc<dyn SecureStore> = Arc::new(FakeSecrets(Mutex::new(HashMap::new())));
        assert!(JellyfinClient::new(config, store).is_err());
    }

    #[test]
    fn status_mapping_covers_the_error_taxonomy() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, None),
            LibraryError::Auth(_)
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, Some(("Album", "al1"))),
            LibraryError::NotFound { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, None),
            LibraryError::Network(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, None),
            LibraryError::Network(_)
        ));
    }

    #[test]
    fn secret_key_scopes_by_account_and_server() {
        assert_eq!(
            secret_key("alice", "https://music.example.org"),
            "alice@https://music.example.org"
        );
    }
}
