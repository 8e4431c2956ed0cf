//! Catalog entities cached locally and mirrored from the server.
//!
//! Identity is the server-assigned id string. Two values with the same id
//! compare equal regardless of the other fields, which lets collection
//! diffing and upserts key purely on identity.

use serde::{Deserialize, Serialize};

/// Anything the cache can persist under a stable string id.
pub trait Entity: Serialize + for<'de> Deserialize<'de> + Clone + Send + Sync {
    /// Stable identifier, unique within the entity's collection.
    fn entity_id(&self) -> &str;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    /// Name used for ordering. Defaults to `name` when the server does not
    /// provide a separate sort key.
    pub sort_name: String,
}

impl Artist {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            sort_name: name.clone(),
            name,
        }
    }

    pub fn with_sort_name(mut self, sort_name: impl Into<String>) -> Self {
        self.sort_name = sort_name.into();
        self
    }
}

impl PartialEq for Artist {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Artist {}

impl Entity for Artist {
    fn entity_id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub artist_name: String,
    /// Id of the owning artist, when the server reports one. Kept as a weak
    /// reference so an album survives its artist disappearing from the cache.
    pub artist_id: Option<String>,
    pub is_favorite: bool,
    /// Local-only flag, never sent to or overwritten by the server.
    #[serde(default)]
    pub is_downloaded: bool,
}

impl Album {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        artist_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artist_name: artist_name.into(),
            artist_id: None,
            is_favorite: false,
            is_downloaded: false,
        }
    }

    pub fn with_artist_id(mut self, artist_id: impl Into<String>) -> Self {
        self.artist_id = Some(artist_id.into());
        self
    }

    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }
}

impl PartialEq for Album {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Album {}

impl Entity for Album {
    fn entity_id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub id: String,
    /// Track number within its disc.
    pub index: u32,
    pub name: String,
    /// Id of the album this song belongs to, as a weak reference.
    pub parent_id: String,
    pub is_favorite: bool,
    pub runtime_secs: u64,
    #[serde(default = "default_disc_number")]
    pub disc_number: u32,
}

fn default_disc_number() -> u32 {
    1
}

impl Song {
    pub fn new(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        name: impl Into<String>,
        index: u32,
    ) -> Self {
        Self {
            id: id.into(),
            index,
            name: name.into(),
            parent_id: parent_id.into(),
            is_favorite: false,
            runtime_secs: 0,
            disc_number: 1,
        }
    }

    pub fn with_runtime(mut self, runtime_secs: u64) -> Self {
        self.runtime_secs = runtime_secs;
        self
    }

    pub fn on_disc(mut self, disc_number: u32) -> Self {
        self.disc_number = disc_number;
        self
    }

    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }
}

impl PartialEq for Song {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Song {}

impl Entity for Song {
    fn entity_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_keys_on_id_only() {
        let a = Song::new("s1", "al1", "Opening", 1);
        let b = Song::new("s1", "al9", "Renamed", 7).with_runtime(300);
        assert_eq!(a, b);

        let c = Song::new("s2", "al1", "Opening", 1);
        assert_ne!(a, c);
    }

    #[test]
    fn artist_sort_name_defaults_to_name() {
        let plain = Artist::new("ar1", "The Band");
        assert_eq!(plain.sort_name, "The Band");

        let sorted = Artist::new("ar1", "The Band").with_sort_name("Band, The");
        assert_eq!(sorted.sort_name, "Band, The");
    }

    #[test]
    fn song_disc_number_defaults_on_deserialize() {
        let json = r#"{
            "id": "s1",
            "index": 3,
            "name": "Interlude",
            "parent_id": "al1",
            "is_favorite": false,
            "runtime_secs": 42
        }"#;
        let song: Song = serde_json::from_str(json).unwrap();
        assert_eq!(song.disc_number, 1);
    }
}
