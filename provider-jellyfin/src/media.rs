use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

use core_library::{MediaService, Result};

use crate::client::JellyfinClient;

#[async_trait]
impl MediaService for JellyfinClient {
    async fn set_favorite(&self, item_id: &str, is_favorite: bool) -> Result<()> {
        let session = self.ensure_session().await?;
        let path = format!("Users/{}/FavoriteItems/{}", session.user_id, item_id);
        let method = if is_favorite {
            Method::POST
        } else {
            Method::DELETE
        };
        debug!(item_id, is_favorite, "writing favorite flag");
        self.send_no_body(method, &path, Some(("Item", item_id)))
            .await
    }
}
