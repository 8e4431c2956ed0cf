//! Workspace facade crate.
//!
//! Host applications can depend on `attune-workspace` and reach the whole
//! core through `core-service` without wiring each workspace crate
//! individually.

pub use core_service;
