//! Desktop host adapters.
//!
//! Concrete implementations of the bridge traits for desktop platforms:
//! SQLite-backed object collections and OS-keychain credential storage.

pub mod secure_store;
pub mod store;

pub use secure_store::KeyringSecureStore;
pub use store::SqliteObjectStore;
