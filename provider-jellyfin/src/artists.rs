use async_trait::async_trait;
use tracing::debug;

use core_library::{Artist, ArtistService, Result};

use crate::client::JellyfinClient;
use crate::dto::{ArtistDto, ItemsPage};

#[async_trait]
impl ArtistService for JellyfinClient {
    async fn artists(&self, page_size: u32, offset: u32) -> Result<Vec<Artist>> {
        let page: ItemsPage<ArtistDto> = self
            .get_json(
                "Artists",
                &[
                    ("StartIndex", offset.to_string()),
                    ("Limit", page_size.to_string()),
                    ("SortBy", "SortName".to_string()),
                ],
                None,
            )
            .await?;
        debug!(offset, count = page.items.len(), "fetched artists page");
        Ok(page.items.into_iter().map(ArtistDto::into_model).collect())
    }
}
