//! Jellyfin provider.
//!
//! Implements the `core-library` remote service contracts against a
//! Jellyfin server's HTTP API. One [`JellyfinClient`] carries the session
//! and implements every service trait, so a single `Arc` can be handed to
//! each repository.

mod albums;
mod artists;
mod client;
mod dto;
mod media;
mod songs;
mod stream;
mod system;

pub use client::{secret_key, JellyfinClient};
