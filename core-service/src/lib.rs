//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (object stores,
//! secure storage, the audio backend) together with the Jellyfin provider
//! into one [`MusicService`] handle a host application drives: repositories
//! for the catalog, the playback session, the shared event bus and server
//! diagnostics.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use tracing::info;

use bridge_traits::{AudioBackend, ObjectStore, SecureStore, SourceResolver};
use core_library::{
    AlbumRepository, ArtistRepository, ServerInfo, SongRepository, Store, SystemService,
};
use core_playback::MusicPlayer;
use core_runtime::{CoreConfig, CoreEvent, EventBus};
use provider_jellyfin::{secret_key, JellyfinClient};

/// Aggregated handle to all bridge dependencies the core requires.
///
/// Each catalog collection gets its own object store so bulk removal of one
/// collection never touches another.
pub struct CoreDependencies {
    pub artist_store: Arc<dyn ObjectStore>,
    pub album_store: Arc<dyn ObjectStore>,
    pub song_store: Arc<dyn ObjectStore>,
    pub secure_store: Arc<dyn SecureStore>,
    pub audio_backend: Arc<dyn AudioBackend>,
}

/// Primary façade exposed to host applications.
///
/// Must be constructed inside a tokio runtime; the playback engine spawns a
/// background watcher on creation.
pub struct MusicService {
    config: CoreConfig,
    events: EventBus,
    client: Arc<JellyfinClient>,
    secure_store: Arc<dyn SecureStore>,
    artists: Arc<ArtistRepository>,
    albums: Arc<AlbumRepository>,
    songs: Arc<SongRepository>,
    player: Arc<MusicPlayer>,
}

impl MusicService {
    pub fn new(config: CoreConfig, deps: CoreDependencies) -> Result<Self> {
        config
            .validate()
            .map_err(|err| CoreError::InvalidConfig(err.to_string()))?;

        let events = EventBus::default();
        let client = Arc::new(
            JellyfinClient::new(config.clone(), Arc::clone(&deps.secure_store))
                .map_err(|err| CoreError::InitializationFailed(err.to_string()))?,
        );

        let artists = Arc::new(ArtistRepository::new(
            Store::new(deps.artist_store),
            client.clone(),
            client.clone(),
            events.clone(),
            config.page_size,
        ));
        let albums = Arc::new(AlbumRepository::new(
            Store::new(deps.album_store),
            client.clone(),
            client.clone(),
            client.clone(),
            events.clone(),
        ));
        let songs = Arc::new(SongRepository::new(
            Store::new(deps.song_store),
            client.clone(),
            client.clone(),
            client.clone(),
            events.clone(),
        ));
        let player = Arc::new(MusicPlayer::new(deps.audio_backend, events.clone()));

        info!(server = %config.server_url, username = %config.username, "core assembled");
        Ok(Self {
            config,
            events,
            client,
            secure_store: deps.secure_store,
            artists,
            albums,
            songs,
            player,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn artists(&self) -> Arc<ArtistRepository> {
        Arc::clone(&self.artists)
    }

    pub fn albums(&self) -> Arc<AlbumRepository> {
        Arc::clone(&self.albums)
    }

    pub fn songs(&self) -> Arc<SongRepository> {
        Arc::clone(&self.songs)
    }

    pub fn player(&self) -> Arc<MusicPlayer> {
        Arc::clone(&self.player)
    }

    /// Resolver turning scheduled song ids into playable stream sources.
    /// Hosts hand this to their audio backend implementation.
    pub fn source_resolver(&self) -> Arc<dyn SourceResolver> {
        self.client.clone()
    }

    pub fn events(&self) -> EventBus {
        self.events.clone()
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<CoreEvent> {
        self.events.subscribe()
    }

    /// Stores the account password in the host's secure storage, keyed by
    /// account and server so multiple accounts can coexist.
    pub async fn store_password(&self, password: &str) -> Result<()> {
        let key = secret_key(&self.config.username, &self.config.server_url);
        self.secure_store
            .set_secret(&key, password)
            .await
            .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
        Ok(())
    }

    /// Removes the stored account password.
    pub async fn forget_password(&self) -> Result<()> {
        let key = secret_key(&self.config.username, &self.config.server_url);
        self.secure_store
            .delete_secret(&key)
            .await
            .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
        Ok(())
    }

    /// Reachability probe against the configured server.
    pub async fn ping(&self) -> Result<bool> {
        Ok(self.client.ping().await?)
    }

    /// Name and version of the configured server.
    pub async fn server_info(&self) -> Result<ServerInfo> {
        Ok(self.client.server_info().await?)
    }
}
