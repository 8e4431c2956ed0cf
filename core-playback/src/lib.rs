//! Playback session engine.
//!
//! [`MusicPlayer`] drives a platform [`AudioBackend`](bridge_traits::AudioBackend)
//! from a [`PlayQueue`] of catalog songs, keeping queue, history and the
//! current song consistent across transport commands, end-of-track signals
//! and audio-session interruptions.

pub mod error;
pub mod queue;
pub mod player;

pub use error::{PlaybackError, Result};
pub use player::{MusicPlayer, PlayerSnapshot};
pub use queue::{PlayQueue, Position};
