use std::fmt::Display;
use std::{fmt, io};
use std::num::ParseIntError;
use std::str::Utf8Error;
use std::string::FromUtf8Error;

/// Crate-wide error type for the ambient stack (config loading, codec
/// primitives). Component-specific failure modes (field coercion, the
/// row-write state machine, the SQL transformer) have their own error enums
/// defined in their owning crates.
#[derive(Debug)]
pub enum ReError {
    /// A condition that should be unreachable; if it fires, it's a bug.
    Bug(String),
    /// A recoverable error surfaced to the caller.
    Error(String),

    /// Byte stream ended before a fixed-width value could be decoded.
    Incomplete(Needed),

    IoError(io::Error),
    Utf8Error(Utf8Error),
    FromUtf8Error(FromUtf8Error),
    ParseIntError(ParseIntError),

    ConfigFileParseErr(String),
    TableSchemaIntoErr(String),
}

impl Display for ReError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> fmt::Result {
        match self {
            ReError::Bug(s) | ReError::Error(s)
            | ReError::ConfigFileParseErr(s) | ReError::TableSchemaIntoErr(s) => {
                write!(f, "{}", s)
            }
            ReError::Incomplete(n) => write!(f, "{}", n),
            ReError::IoError(err) => write!(f, "{}", err),
            ReError::Utf8Error(err) => write!(f, "{}", err),
            ReError::FromUtf8Error(err) => write!(f, "{}", err),
            ReError::ParseIntError(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ReError {}

impl From<io::Error> for ReError {
    fn from(error: io::Error) -> Self {
        ReError::IoError(error)
    }
}

impl From<Utf8Error> for ReError {
    fn from(error: Utf8Error) -> Self {
        ReError::Utf8Error(error)
    }
}

impl From<FromUtf8Error> for ReError {
    fn from(error: FromUtf8Error) -> Self {
        ReError::FromUtf8Error(error)
    }
}

impl From<ParseIntError> for ReError {
    fn from(error: ParseIntError) -> Self {
        ReError::ParseIntError(error)
    }
}

/// Contains information on needed data if a parser returned `Incomplete`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Needed {
    /// Needs more data, but we do not know how much.
    Unknown,
    NoEnoughData,
    InvalidUtf8,
    InvalidData(String),
}

impl Display for Needed {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> fmt::Result {
        match self {
            Needed::Unknown => write!(f, "unknown"),
            Needed::NoEnoughData => write!(f, "not enough data"),
            Needed::InvalidUtf8 => write!(f, "invalid utf8"),
            Needed::InvalidData(s) => write!(f, "{}", s),
        }
    }
}

impl From<Needed> for ReError {
    fn from(err: Needed) -> Self {
        ReError::Incomplete(err)
    }
}
