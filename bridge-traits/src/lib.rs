//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the core library and platform-specific
//! implementations. Each trait represents a capability the core requires but that
//! is provided differently per platform (desktop, iOS, Android):
//!
//! - [`ObjectStore`](storage::ObjectStore) - Durable keyed object collections
//!   backing the local catalog cache
//! - [`SecureStore`](storage::SecureStore) - Credential persistence
//!   (Keychain/Keystore/Credential Manager)
//! - [`AudioBackend`](audio::AudioBackend) - Platform audio engine adapter
//! - [`SourceResolver`](audio::SourceResolver) - Playable-source resolution
//!   (local file vs. remote stream)
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Platform
//! implementations should convert platform-specific errors to `BridgeError` and
//! provide actionable messages.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so implementations can be
//! shared across async tasks behind `Arc`.

pub mod audio;
pub mod error;
pub mod storage;

pub use audio::{AudioBackend, PlaybackSource, PlayerState, SourceResolver};
pub use error::BridgeError;
pub use storage::{MemoryObjectStore, ObjectRecord, ObjectStore, SecureStore};
