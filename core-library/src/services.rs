//! Remote service contracts the catalog repositories sync against.
//!
//! A provider crate implements these against a concrete server API. The
//! repositories only ever see these traits, so provider failures arrive
//! already mapped into [`LibraryError`](crate::LibraryError).

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Album, Artist, Song};

/// Session management for the remote server.
///
/// `authenticate` must be cheap to call repeatedly. Implementations are
/// expected to reuse a live session and only hit the network when no valid
/// token is held.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Session: Send + Sync {
    /// Ensures a valid session exists, returning the server-side user id.
    async fn authenticate(&self) -> Result<String>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtistService: Send + Sync {
    /// Fetches one page of artists. An empty page means the listing is
    /// exhausted.
    async fn artists(&self, page_size: u32, offset: u32) -> Result<Vec<Artist>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlbumService: Send + Sync {
    async fn albums(&self) -> Result<Vec<Album>>;

    /// Fetches a single album by id. Unknown ids yield
    /// [`LibraryError::NotFound`](crate::LibraryError::NotFound).
    async fn album(&self, album_id: &str) -> Result<Album>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SongService: Send + Sync {
    async fn songs(&self) -> Result<Vec<Song>>;

    async fn songs_in_album(&self, album_id: &str) -> Result<Vec<Song>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaService: Send + Sync {
    /// Records the favorite state of an item on the server.
    async fn set_favorite(&self, item_id: &str, is_favorite: bool) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub server_name: String,
    pub version: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SystemService: Send + Sync {
    /// Lightweight reachability probe. `false` means the server answered
    /// with something other than success, errors mean it did not answer.
    async fn ping(&self) -> Result<bool>;

    async fn server_info(&self) -> Result<ServerInfo>;
}
