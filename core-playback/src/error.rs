use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The platform audio backend refused or failed a command.
    #[error("Audio backend failure: {0}")]
    Backend(#[from] bridge_traits::BridgeError),
}

pub type Result<T> = std::result::Result<T, PlaybackError>;
