use async_trait::async_trait;
use tracing::debug;

use core_library::{Album, AlbumService, Result};

use crate::client::JellyfinClient;
use crate::dto::{AlbumDto, ItemsPage};

#[async_trait]
impl AlbumService for JellyfinClient {
    async fn albums(&self) -> Result<Vec<Album>> {
        let page: ItemsPage<AlbumDto> = self
            .get_json(
                "Items",
                &[
                    ("IncludeItemTypes", "MusicAlbum".to_string()),
                    ("Recursive", "true".to_string()),
                    ("SortBy", "SortName".to_string()),
                ],
                None,
            )
            .await?;
        debug!(count = page.items.len(), "fetched albums");
        Ok(page.items.into_iter().map(AlbumDto::into_model).collect())
    }

    async fn album(&self, album_id: &str) -> Result<Album> {
        let session = self.ensure_session().await?;
        let path = format!("Users/{}/Items/{}", session.user_id, album_id);
        let dto: AlbumDto = self
            .get_json(&path, &[], Some(("Album", album_id)))
            .await?;
        Ok(dto.into_model())
    }
}
