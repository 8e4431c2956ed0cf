//! Repositories tying the local cache to the remote services.
//!
//! Each repository owns one collection. Refresh operations authenticate
//! first, then pull from the remote service and rewrite the cache; reads
//! only ever touch the cache. A refresh that fails partway leaves whatever
//! state the failure produced, the next successful refresh rewrites it.
//!
//! Refreshes on the same repository are serialized through an internal
//! lock. Reads are never blocked by a running refresh.

mod album;
mod artist;
mod song;

pub use album::AlbumRepository;
pub use artist::ArtistRepository;
pub use song::SongRepository;
