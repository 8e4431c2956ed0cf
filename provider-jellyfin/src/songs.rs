use async_trait::async_trait;
use tracing::debug;

use core_library::{Result, Song, SongService};

use crate::client::JellyfinClient;
use crate::dto::{ItemsPage, SongDto};

#[async_trait]
impl SongService for JellyfinClient {
    async fn songs(&self) -> Result<Vec<Song>> {
        let page: ItemsPage<SongDto> = self
            .get_json(
                "Items",
                &[
                    ("IncludeItemTypes", "Audio".to_string()),
                    ("Recursive", "true".to_string()),
                ],
                None,
            )
            .await?;
        debug!(count = page.items.len(), "fetched songs");
        Ok(page.items.into_iter().map(SongDto::into_model).collect())
    }

    async fn songs_in_album(&self, album_id: &str) -> Result<Vec<Song>> {
        let page: ItemsPage<SongDto> = self
            .get_json(
                "Items",
                &[
                    ("IncludeItemTypes", "Audio".to_string()),
                    ("ParentId", album_id.to_string()),
                    ("SortBy", "ParentIndexNumber,IndexNumber".to_string()),
                ],
                Some(("Album", album_id)),
            )
            .await?;
        Ok(page.items.into_iter().map(SongDto::into_model).collect())
    }
}
