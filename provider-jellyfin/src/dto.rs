//! Wire types for the Jellyfin API, mapped onto the catalog models.

use serde::Deserialize;

use core_library::{Album, Artist, ServerInfo, Song};

/// One tick is 100 nanoseconds.
const TICKS_PER_SECOND: u64 = 10_000_000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ItemsPage<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct UserData {
    #[serde(default)]
    pub is_favorite: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct NameIdPair {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ArtistDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub sort_name: Option<String>,
}

impl ArtistDto {
    pub fn into_model(self) -> Artist {
        let mut artist = Artist::new(self.id, self.name);
        if let Some(sort_name) = self.sort_name.filter(|s| !s.is_empty()) {
            artist = artist.with_sort_name(sort_name);
        }
        artist
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct AlbumDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub album_artist: Option<String>,
    #[serde(default)]
    pub album_artists: Vec<NameIdPair>,
    pub user_data: Option<UserData>,
}

impl AlbumDto {
    pub fn into_model(self) -> Album {
        let artist_name = self
            .album_artist
            .filter(|name| !name.is_empty())
            .or_else(|| self.album_artists.first().map(|pair| pair.name.clone()))
            .unwrap_or_else(|| "Unknown Artist".to_string());
        let artist_id = self.album_artists.into_iter().find_map(|pair| pair.id);
        let is_favorite = self.user_data.map(|d| d.is_favorite).unwrap_or(false);

        let mut album = Album::new(self.id, self.name, artist_name).favorite(is_favorite);
        if let Some(artist_id) = artist_id {
            album = album.with_artist_id(artist_id);
        }
        album
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SongDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub index_number: Option<u32>,
    /// Disc number for multi-disc albums.
    pub parent_index_number: Option<u32>,
    pub album_id: Option<String>,
    pub run_time_ticks: Option<u64>,
    pub user_data: Option<UserData>,
}

impl SongDto {
    pub fn into_model(self) -> Song {
        let is_favorite = self.user_data.map(|d| d.is_favorite).unwrap_or(false);
        Song::new(
            self.id,
            self.album_id.unwrap_or_default(),
            self.name,
            self.index_number.unwrap_or(0),
        )
        .with_runtime(self.run_time_ticks.unwrap_or(0) / TICKS_PER_SECOND)
        .on_disc(self.parent_index_number.unwrap_or(1))
        .favorite(is_favorite)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct AuthenticationResult {
    pub access_token: Option<String>,
    pub user: Option<AuthenticatedUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct AuthenticatedUser {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PublicSystemInfo {
    pub server_name: Option<String>,
    pub version: Option<String>,
}

impl PublicSystemInfo {
    pub fn into_model(self) -> ServerInfo {
        ServerInfo {
            server_name: self.server_name.unwrap_or_else(|| "unknown".to_string()),
            version: self.version.unwrap_or_else(|| "unknown".to_string()),
        }
    }
}
