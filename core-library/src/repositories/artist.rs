use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use core_runtime::{CoreEvent, EventBus, LibraryEvent};

use crate::error::Result;
use crate::models::Artist;
use crate::services::{ArtistService, Session};
use crate::store::Store;

/// Cached artist collection, refreshed from the server one page at a time.
pub struct ArtistRepository {
    store: Store<Artist>,
    service: Arc<dyn ArtistService>,
    session: Arc<dyn Session>,
    events: EventBus,
    page_size: u32,
    refresh_lock: Mutex<()>,
}

impl ArtistRepository {
    pub fn new(
        store: Store<Artist>,
        service: Arc<dyn ArtistService>,
        session: Arc<dyn Session>,
        events: EventBus,
        page_size: u32,
    ) -> Self {
        Self {
            store,
            service,
            session,
            events,
            page_size,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Replaces the cached collection with the server's listing.
    ///
    /// The cache is cleared up front and each fetched page is inserted as
    /// it arrives, so observers see the collection fill in incrementally.
    /// Pagination stops at the first empty page.
    pub async fn refresh(&self) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;
        self.session.authenticate().await?;

        self.store.remove_all().await?;

        let mut offset = 0u32;
        let mut total = 0usize;
        loop {
            let page = self.service.artists(self.page_size, offset).await?;
            if page.is_empty() {
                break;
            }
            debug!(offset, page_len = page.len(), "fetched artist page");
            total += page.len();
            self.store.insert(&page).await?;
            offset += self.page_size;
        }

        info!(count = total, "artist refresh complete");
        self.events
            .emit(CoreEvent::Library(LibraryEvent::ArtistsRefreshed {
                count: total,
            }))
            .ok();
        Ok(())
    }

    /// All cached artists, ordered by sort name.
    pub async fn all(&self) -> Result<Vec<Artist>> {
        let mut artists = self.store.load_all().await?;
        artists.sort_by(|a, b| {
            a.sort_name
                .to_lowercase()
                .cmp(&b.sort_name.to_lowercase())
        });
        Ok(artists)
    }

    pub async fn by_id(&self, id: &str) -> Result<Option<Artist>> {
        self.store.by_id(id).await
    }
}
