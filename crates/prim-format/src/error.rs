//! Errors surfaced by the persisted document layer (§4.9).

use std::fmt;

/// Everything that can go wrong reading or writing a [`crate::Document`].
#[derive(Debug)]
pub enum FormatError {
    /// The TOML text did not parse, or did not match the document shape.
    Toml(toml::de::Error),
    /// A valid document could not be re-serialized back to TOML text.
    Serialize(toml::ser::Error),
    /// A file could not be read or written.
    Io(std::io::Error),
    /// A `memory`/`tokens` field was not valid base64.
    Base64(base64::DecodeError),
    /// A field had the right type but a shape the rest of the toolchain
    /// cannot use (e.g. a `memory` blob that isn't exactly 65 536 bytes).
    BadShape(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toml(e) => write!(f, "malformed document: {e}"),
            Self::Serialize(e) => write!(f, "could not serialize document: {e}"),
            Self::Io(e) => write!(f, "i/o error: {e}"),
            Self::Base64(e) => write!(f, "malformed base64 field: {e}"),
            Self::BadShape(msg) => write!(f, "malformed document: {msg}"),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Toml(e) => Some(e),
            Self::Serialize(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Base64(e) => Some(e),
            Self::BadShape(_) => None,
        }
    }
}

impl From<toml::de::Error> for FormatError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

impl From<toml::ser::Error> for FormatError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Serialize(e)
    }
}

impl From<std::io::Error> for FormatError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<base64::DecodeError> for FormatError {
    fn from(e: base64::DecodeError) -> Self {
        Self::Base64(e)
    }
}
