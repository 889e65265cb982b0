//! Error types for format dispatch.

use thiserror::Error;

/// Errors that can occur when converting assets.
#[derive(Debug, Error)]
pub enum Error {
    /// The data starts with no known magic.
    #[error("unrecognized file magic \"{0}\"")]
    UnknownMagic(String),

    /// The name does not select a known format.
    #[error("unrecognized format {0:?} (expected brlyt, brctr or bmg)")]
    UnknownFormat(String),

    /// Layout error.
    #[error("{0}")]
    Layout(#[from] wuj_brlyt::Error),

    /// Control file error.
    #[error("{0}")]
    Control(#[from] wuj_brctr::Error),

    /// Message catalog error.
    #[error("{0}")]
    Messages(#[from] wuj_bmg::Error),
}

/// Result type for format dispatch.
pub type Result<T> = std::result::Result<T, Error>;
