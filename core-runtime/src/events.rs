//! # Event Bus
//!
//! Event-driven state observation for the attune core, built on
//! `tokio::sync::broadcast`.
//!
//! Every mutable piece of core state (catalog collections, playback queue,
//! current song, player state, elapsed time) announces its changes as a typed
//! event. Consumers subscribe explicitly; each subscription is an independent
//! receiver and is cancelled simply by dropping it. There is no hidden global
//! broadcast: components are handed an [`EventBus`] at construction.
//!
//! ```text
//! ┌──────────────┐    emit     ┌───────────┐
//! │ Repositories ├────────────>│           │   subscribe   ┌────────────┐
//! └──────────────┘             │ EventBus  ├──────────────>│ Subscriber │
//! ┌──────────────┐    emit     │ (broadcast│               └────────────┘
//! │ MusicPlayer  ├────────────>│  channel) ├──────────────>│ Subscriber │
//! └──────────────┘             └───────────┘               └────────────┘
//! ```
//!
//! Subscribers that fall behind receive `RecvError::Lagged(n)` (non-fatal,
//! they keep receiving newer events); `RecvError::Closed` signals shutdown.

use bridge_traits::audio::PlayerState;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Catalog cache events
    Library(LibraryEvent),
    /// Playback session events
    Player(PlayerEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Library(e) => e.description(),
            CoreEvent::Player(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Player(PlayerEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Library(LibraryEvent::ArtistsRefreshed { .. })
            | CoreEvent::Library(LibraryEvent::AlbumsRefreshed { .. })
            | CoreEvent::Library(LibraryEvent::SongsRefreshed { .. })
            | CoreEvent::Library(LibraryEvent::FavoriteChanged { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Library Events
// ============================================================================

/// Events emitted by the catalog repositories after successful mutations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LibraryEvent {
    /// Full artist resynchronization finished.
    ArtistsRefreshed {
        /// Number of artists now in the local cache.
        count: usize,
    },
    /// Full album resynchronization finished.
    AlbumsRefreshed {
        /// Number of albums now in the local cache.
        count: usize,
    },
    /// Full song resynchronization finished.
    SongsRefreshed {
        /// Number of songs now in the local cache.
        count: usize,
    },
    /// A single item was fetched from the server and upserted.
    ItemRefreshed {
        /// The refreshed item id.
        item_id: String,
    },
    /// A favorite flag was confirmed by the server and mirrored locally.
    FavoriteChanged {
        /// The item whose flag changed.
        item_id: String,
        /// The new flag value.
        is_favorite: bool,
    },
}

impl LibraryEvent {
    fn description(&self) -> &str {
        match self {
            LibraryEvent::ArtistsRefreshed { .. } => "Artist cache refreshed",
            LibraryEvent::AlbumsRefreshed { .. } => "Album cache refreshed",
            LibraryEvent::SongsRefreshed { .. } => "Song cache refreshed",
            LibraryEvent::ItemRefreshed { .. } => "Item refreshed from server",
            LibraryEvent::FavoriteChanged { .. } => "Favorite flag changed",
        }
    }
}

// ============================================================================
// Player Events
// ============================================================================

/// Events emitted by the playback session engine on field changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlayerEvent {
    /// Player state machine transitioned.
    StateChanged {
        /// The new state.
        state: PlayerState,
    },
    /// A different song (or none) became current.
    CurrentSongChanged {
        /// The new current song id, `None` after stop.
        song_id: Option<String>,
    },
    /// The playback queue was mutated.
    QueueChanged {
        /// Queue length after the mutation.
        size: usize,
    },
    /// The playback history was mutated.
    HistoryChanged {
        /// History length after the mutation.
        size: usize,
    },
    /// Elapsed time within the current track advanced.
    ElapsedChanged {
        /// Whole seconds into the current track.
        seconds: u64,
    },
    /// A playback operation failed and was abandoned.
    Error {
        /// The song involved, if known.
        song_id: Option<String>,
        /// Human-readable error message.
        message: String,
    },
}

impl PlayerEvent {
    fn description(&self) -> &str {
        match self {
            PlayerEvent::StateChanged { .. } => "Player state changed",
            PlayerEvent::CurrentSongChanged { .. } => "Current song changed",
            PlayerEvent::QueueChanged { .. } => "Playback queue changed",
            PlayerEvent::HistoryChanged { .. } => "Playback history changed",
            PlayerEvent::ElapsedChanged { .. } => "Elapsed time changed",
            PlayerEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally: multiple producers (clone the
/// `EventBus`), multiple consumers (each `subscribe()` creates a new
/// receiver), non-blocking sends, lagging detection for slow subscribers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// when nobody is listening. Emitting into an empty bus is not a fault;
    /// callers usually `ok()` the result.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that will receive all future
    /// events. Past events are not replayed. Dropping the receiver cancels
    /// the subscription.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```no_run
/// use core_runtime::events::{EventBus, EventStream, CoreEvent};
///
/// # #[tokio::main]
/// # async fn main() {
/// let bus = EventBus::default();
/// let mut players = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Player(_)));
/// # }
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Attach a predicate; events that fail it are skipped silently.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receive the next event passing the filter.
    ///
    /// `Lagged` errors are propagated so callers can decide whether missed
    /// events matter to them.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            match &self.filter {
                Some(predicate) if !predicate(&event) => continue,
                _ => return Ok(event),
            }
        }
    }
}
