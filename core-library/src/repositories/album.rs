use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use core_runtime::{CoreEvent, EventBus, LibraryEvent};

use crate::error::{LibraryError, Result};
use crate::models::Album;
use crate::services::{AlbumService, MediaService, Session};
use crate::store::Store;

/// Cached album collection.
///
/// Full refreshes replace everything the server reports while carrying the
/// local-only download flag across, so a refresh never forgets what is on
/// disk.
pub struct AlbumRepository {
    store: Store<Album>,
    service: Arc<dyn AlbumService>,
    media: Arc<dyn MediaService>,
    session: Arc<dyn Session>,
    events: EventBus,
    refresh_lock: Mutex<()>,
}

impl AlbumRepository {
    pub fn new(
        store: Store<Album>,
        service: Arc<dyn AlbumService>,
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

    /// Replaces the cached collection with the server's listing, preserving
    /// each surviving album's download flag.
    pub async fn refresh(&self) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;
        self.session.authenticate().await?;

        let mut remote = self.service.albums().await?;
        let downloaded: HashMap<String, bool> = self
            .store
            .load_all()
            .await?
            .into_iter()
            .map(|a| (a.id, a.is_downloaded))
            .collect();
        for album in &mut remote {
            if let Some(&flag) = downloaded.get(&album.id) {
                album.is_downloaded = flag;
            }
        }

        self.store.remove_all().await?;
        self.store.insert(&remote).await?;

        info!(count = remote.len(), "album refresh complete");
        self.events
            .emit(CoreEvent::Library(LibraryEvent::AlbumsRefreshed {
                count: remote.len(),
            }))
            .ok();
        Ok(())
    }

    /// Re-fetches a single album and upserts it, leaving the rest of the
    /// collection untouched.
    pub async fn refresh_one(&self, album_id: &str) -> Result<()> {
        self.session.authenticate().await?;

        let mut album = self.service.album(album_id).await?;
        if let Some(existing) = self.store.by_id(album_id).await? {
            album.is_downloaded = existing.is_downloaded;
        }
        self.store.insert(&[album]).await?;

        self.events
            .emit(CoreEvent::Library(LibraryEvent::ItemRefreshed {
                item_id: album_id.to_string(),
            }))
            .ok();
        Ok(())
    }

    /// Sets the favorite flag remotely first, then mirrors it locally.
    ///
    /// Unknown ids fail before any network traffic. A remote failure leaves
    /// the cached flag unchanged.
    pub async fn set_favorite(&self, album_id: &str, is_favorite: bool) -> Result<()> {
        let Some(mut album) = self.store.by_id(album_id).await? else {
            warn!(album_id, "favorite requested for unknown album");
            return Err(LibraryError::not_found("Album", album_id));
        };

        self.media.set_favorite(album_id, is_favorite).await?;

        album.is_favorite = is_favorite;
        self.store.insert(&[album]).await?;

        self.events
            .emit(CoreEvent::Library(LibraryEvent::FavoriteChanged {
                item_id: album_id.to_string(),
                is_favorite,
            }))
            .ok();
        Ok(())
    }

    /// Marks an album as present on (or removed from) local storage. This
    /// flag lives only in the cache, no remote call is made.
    pub async fn set_downloaded(&self, album_id: &str, is_downloaded: bool) -> Result<()> {
        let Some(mut album) = self.store.by_id(album_id).await? else {
            return Err(LibraryError::not_found("Album", album_id));
        };
        album.is_downloaded = is_downloaded;
        self.store.insert(&[album]).await?;
        Ok(())
    }

    /// All cached albums, ordered by name.
    pub async fn all(&self) -> Result<Vec<Album>> {
        let mut albums = self.store.load_all().await?;
        albums.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(albums)
    }

    pub async fn by_id(&self, id: &str) -> Result<Option<Album>> {
        self.store.by_id(id).await
    }

    pub async fn favorites(&self) -> Result<Vec<Album>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|a| a.is_favorite)
            .collect())
    }

    pub async fn downloaded(&self) -> Result<Vec<Album>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|a| a.is_downloaded)
            .collect())
    }

    pub async fn by_artist(&self, artist_id: &str) -> Result<Vec<Album>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|a| a.artist_id.as_deref() == Some(artist_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{MockAlbumService, MockMediaService, MockSession};
    use bridge_traits::MemoryObjectStore;
    use mockall::predicate::eq;

    fn authed_session() -> MockSession {
        let mut session = MockSession::new();
        session
            .expect_authenticate()
            .returning(|| Ok("user-1".to_string()));
        session
    }

    fn repo(
        service: MockAlbumService,
        media: MockMediaService,
        session: MockSession,
    ) -> AlbumRepository {
        AlbumRepository::new(
            Store::new(Arc::new(MemoryObjectStore::new())),
            Arc::new(service),
            Arc::new(media),
            Arc::new(session),
            EventBus::default(),
        )
    }

    #[tokio::test]
    async fn refresh_replaces_collection_but_keeps_download_flags() {
        let mut service = MockAlbumService::new();
        service.expect_albums().returning(|| {
            Ok(vec![
                Album::new("al1", "Kept", "Artist"),
                Album::new("al3", "New", "Artist"),
            ])
        });

        let repo = repo(service, MockMediaService::new(), authed_session());
        let mut downloaded = Album::new("al1", "Kept", "Artist");
        downloaded.is_downloaded = true;
        repo.store
            .insert(&[downloaded, Album::new("al2", "Stale", "Artist")])
            .await
            .unwrap();

        repo.refresh().await.unwrap();

        let all = repo.all().await.unwrap();
        assert_eq!(all.len(), 2);
        let kept = all.iter().find(|a| a.id == "al1").unwrap();
        assert!(kept.is_downloaded);
        assert!(all.iter().all(|a| a.id != "al2"));
    }

    #[tokio::test]
    async fn refresh_one_upserts_without_disturbing_others() {
        let mut service = MockAlbumService::new();
        service
            .expect_album()
            .with(eq("al1"))
            .returning(|_| Ok(Album::new("al1", "Renamed", "Artist").favorite(true)));

        let repo = repo(service, MockMediaService::new(), authed_session());
        let mut local = Album::new("al1", "Original", "Artist");
        local.is_downloaded = true;
        repo.store
            .insert(&[local, Album::new("al2", "Other", "Artist")])
            .await
            .unwrap();

        repo.refresh_one("al1").await.unwrap();

        let refreshed = repo.by_id("al1").await.unwrap().unwrap();
        assert_eq!(refreshed.name, "Renamed");
        assert!(refreshed.is_favorite);
        assert!(refreshed.is_downloaded);
        assert!(repo.by_id("al2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn set_favorite_writes_remote_then_local() {
        let mut media = MockMediaService::new();
        media
            .expect_set_favorite()
            .with(eq("al1"), eq(true))
            .returning(|_, _| Ok(()));

        let repo = repo(MockAlbumService::new(), media, MockSession::new());
        repo.store
            .insert(&[Album::new("al1", "Album", "Artist")])
            .await
            .unwrap();
        let mut rx = repo.events.subscribe();

        repo.set_favorite("al1", true).await.unwrap();

        assert!(repo.by_id("al1").await.unwrap().unwrap().is_favorite);
        match rx.recv().await.unwrap() {
            CoreEvent::Library(LibraryEvent::FavoriteChanged {
                item_id,
                is_favorite,
            }) => {
                assert_eq!(item_id, "al1");
                assert!(is_favorite);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn set_favorite_unknown_id_fails_before_remote_call() {
        // No media expectations: a miss must not reach the server.
        let repo = repo(
            MockAlbumService::new(),
            MockMediaService::new(),
            MockSession::new(),
        );

        let err = repo.set_favorite("missing", true).await.unwrap_err();
        assert!(matches!(err, LibraryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn set_favorite_remote_failure_leaves_cache_unchanged() {
        let mut media = MockMediaService::new();
        media
            .expect_set_favorite()
            .returning(|_, _| Err(LibraryError::Network("timeout".into())));

        let repo = repo(MockAlbumService::new(), media, MockSession::new());
        repo.store
            .insert(&[Album::new("al1", "Album", "Artist")])
            .await
            .unwrap();

        let err = repo.set_favorite("al1", true).await.unwrap_err();
        assert!(matches!(err, LibraryError::Network(_)));
        assert!(!repo.by_id("al1").await.unwrap().unwrap().is_favorite);
    }

    #[tokio::test]
    async fn set_downloaded_is_local_only() {
        let repo = repo(
            MockAlbumService::new(),
            MockMediaService::new(),
            MockSession::new(),
        );
        repo.store
            .insert(&[Album::new("al1", "Album", "Artist")])
            .await
            .unwrap();

        repo.set_downloaded("al1", true).await.unwrap();
        assert!(repo.by_id("al1").await.unwrap().unwrap().is_downloaded);

        assert_eq!(repo.downloaded().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn by_artist_filters_on_artist_id() {
        let repo = repo(
            MockAlbumService::new(),
            MockMediaService::new(),
            MockSession::new(),
        );
        repo.store
            .insert(&[
                Album::new("al1", "One", "A").with_artist_id("ar1"),
                Album::new("al2", "Two", "B").with_artist_id("ar2"),
                Album::new("al3", "Three", "C"),
            ])
            .await
            .unwrap();

        let albums = repo.by_artist("ar1").await.unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].id, "al1");
    }
}
