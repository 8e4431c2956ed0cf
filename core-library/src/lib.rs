//! Catalog domain for the music client core.
//!
//! Holds the local cache of artists, albums and songs together with the
//! repositories that keep it in sync with the remote server. Remote access
//! goes through the service traits in [`services`], so providers plug in
//! without this crate knowing anything about wire formats.

pub mod error;
pub mod models;
pub mod repositories;
pub mod services;
pub mod store;

pub use error::{LibraryError, Result};
pub use models::{Album, Artist, Entity, Song};
pub use repositories::{AlbumRepository, ArtistRepository, SongRepository};
pub use services::{
    AlbumService, ArtistService, MediaService, ServerInfo, Session, SongService, SystemService,
};
pub use store::Store;
