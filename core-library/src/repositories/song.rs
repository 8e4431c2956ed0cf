use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use core_runtime::{CoreEvent, EventBus, LibraryEvent};

use crate::error::{LibraryError, Result};
use crate::models::Song;
use crate::services::{MediaService, Session, SongService};
use crate::store::Store;

/// Cached song collection.
pub struct SongRepository {
    store: Store<Song>,
    service: Arc<dyn SongService>,
    media: Arc<dyn MediaService>,
    session: Arc<dyn Session>,
    events: EventBus,
    refresh_lock: Mutex<()>,
}

impl SongRepository {
    pub fn new(
        store: Store<Song>,
        service: Arc<dyn SongService>,
        media: Arc<dyn MediaService>,
        session: Arc<dyn Session>,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            service,
            media,
            session,
            events,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Replaces the cached collection with the server's listing.
    pub async fn refresh(&self) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;
        self.session.authenticate().await?;

        let remote = self.service.songs().await?;
        self.store.remove_all().await?;
        self.store.insert(&remote).await?;

        info!(count = remote.len(), "song refresh complete");
        self.events
            .emit(CoreEvent::Library(LibraryEvent::SongsRefreshed {
                count: remote.len(),
            }))
            .ok();
        Ok(())
    }

    /// Re-fetches the songs of one album and upserts them, leaving songs of
    /// other albums untouched.
    pub async fn refresh_album(&self, album_id: &str) -> Result<()> {
        self.session.authenticate().await?;

        let remote = self.service.songs_in_album(album_id).await?;
        self.store.insert(&remote).await?;

        self.events
            .emit(CoreEvent::Library(LibraryEvent::ItemRefreshed {
                item_id: album_id.to_string(),
            }))
            .ok();
        Ok(())
    }

    /// Sets the favorite flag remotely first, then mirrors it locally.
    pub async fn set_favorite(&self, song_id: &str, is_favorite: bool) -> Result<()> {
        let Some(mut song) = self.store.by_id(song_id).await? else {
            warn!(song_id, "favorite requested for unknown song");
            return Err(LibraryError::not_found("Song", song_id));
        };

        self.media.set_favorite(song_id, is_favorite).await?;

        song.is_favorite = is_favorite;
        self.store.insert(&[song]).await?;

        self.events
            .emit(CoreEvent::Library(LibraryEvent::FavoriteChanged {
                item_id: song_id.to_string(),
                is_favorite,
            }))
            .ok();
        Ok(())
    }

    pub async fn all(&self) -> Result<Vec<Song>> {
        self.store.load_all().await
    }

    pub async fn by_id(&self, id: &str) -> Result<Option<Song>> {
        self.store.by_id(id).await
    }

    /// Songs of one album in playback order: by disc number, then by track
    /// index within the disc.
    pub async fn in_album(&self, album_id: &str) -> Result<Vec<Song>> {
        let mut songs: Vec<Song> = self
            .store
            .load_all()
            .await?
            .into_iter()
            .filter(|s| s.parent_id == album_id)
            .collect();
        songs.sort_by_key(|s| (s.disc_number, s.index));
        Ok(songs)
    }

    /// Songs of one album grouped per disc, each disc in track order.
    pub async fn discs(&self, album_id: &str) -> Result<BTreeMap<u32, Vec<Song>>> {
        let mut discs: BTreeMap<u32, Vec<Song>> = BTreeMap::new();
        for song in self.in_album(album_id).await? {
            discs.entry(song.disc_number).or_default().push(song);
        }
        Ok(discs)
    }

    pub async fn favorites(&self) -> Result<Vec<Song>> {
        Ok(self
            .store
            .load_all()
            .await?
            .into_iter()
            .filter(|s| s.is_favorite)
            .collect())
    }
}
