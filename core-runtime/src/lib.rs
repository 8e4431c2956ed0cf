//! # Core Runtime
//!
//! Shared infrastructure for the attune core: the typed event bus that state
//! observers subscribe to, logging/tracing setup, and client configuration.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::CoreConfig;
pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus, EventStream, LibraryEvent, PlayerEvent};
