//! Error types for enorg operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading an ENEX archive or writing Org output.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid ENEX: {0}")]
    InvalidEnex(String),

    #[error("Missing required element: {0}")]
    MissingElement(String),

    #[error("Media reference to unknown resource: {0}")]
    MissingResource(String),

    #[error("Unbalanced render markers: {0}")]
    UnbalancedMarkers(String),

    #[error("Output directory already exists: {}", .0.display())]
    OutputDirExists(PathBuf),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;
