//! Audio bridge traits.
//!
//! These abstractions let the playback session engine drive a platform audio
//! primitive (AVAudioEngine, ExoPlayer, cpal pipeline, ...) without knowing
//! its internals. The backend mirrors the session engine's queue as its own
//! schedule of track ids; the session engine keeps both in lockstep.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

use crate::error::Result;

/// Playback lifecycle state reported by an audio backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    Inactive,
    Playing,
    Paused,
}

/// A playable source for one track, resolved at playback time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackSource {
    /// Downloaded file available on the host.
    LocalFile { path: PathBuf },
    /// Remote HTTP(S) stream served by the media server.
    RemoteStream { url: String },
}

impl PlaybackSource {
    pub fn is_remote(&self) -> bool {
        matches!(self, PlaybackSource::RemoteStream { .. })
    }
}

/// Resolves a song id to something the audio backend can play.
///
/// Download/retention management lives behind this trait; the core only
/// asks "what do I feed the engine for this id". `Ok(None)` means the song
/// has no playable source right now.
#[async_trait]
pub trait SourceResolver: Send + Sync {
    async fn resolve(&self, song_id: &str) -> Result<Option<PlaybackSource>>;
}

/// Platform audio engine adapter.
///
/// The backend owns a schedule of track ids mirroring the session engine's
/// queue. Control calls are not reentrant; the session engine serializes
/// them through its owner lock and cooperatively cancels an in-flight
/// `advance` that a newer command supersedes. `stop` must be safe to call
/// redundantly (cooperative cancellation relies on this).
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Append a track id to the end of the backend schedule.
    async fn append(&self, song_id: &str) -> Result<()>;

    /// Insert a track id at the front of the backend schedule (played next).
    async fn insert_next(&self, song_id: &str) -> Result<()>;

    /// Start playing the head of the schedule. Transitions state to
    /// `Playing` and begins elapsed-time reporting from zero.
    async fn start(&self) -> Result<()>;

    /// Drop the currently playing item and move to the next scheduled one.
    async fn advance(&self) -> Result<()>;

    /// Pause without losing position. Elapsed-time reporting freezes.
    async fn pause(&self) -> Result<()>;

    /// Resume from the last known position.
    async fn resume(&self) -> Result<()>;

    /// Stop playback, clear the schedule, reset elapsed time to zero.
    /// Safe to call in any state, including repeatedly.
    async fn stop(&self) -> Result<()>;

    /// Observe backend state changes.
    fn subscribe_state(&self) -> watch::Receiver<PlayerState>;

    /// Observe elapsed time within the current track.
    fn subscribe_elapsed(&self) -> watch::Receiver<Duration>;

    /// Observe end-of-track notifications, carrying the finished track id.
    /// The session engine uses this to auto-advance its queue.
    fn subscribe_track_ended(&self) -> broadcast::Receiver<String>;
}
