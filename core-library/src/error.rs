use thiserror::Error;

/// Errors surfaced by the catalog repositories and the remote services
/// backing them.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// The server rejected or could not establish the session.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The server could not be reached or returned a transport failure.
    #[error("Network failure: {0}")]
    Network(String),

    /// The requested item does not exist, locally or remotely.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The local cache could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LibraryError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<bridge_traits::BridgeError> for LibraryError {
    fn from(err: bridge_traits::BridgeError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
