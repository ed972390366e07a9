//! `TransformError`, in the teacher's hand-written `Display`/`From` style
//! (`common/src/err/decode_error.rs`).

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// A record's value array length didn't match its header's field count.
    ArityMismatch { expected: usize, found: usize },
    /// A statement carried zero data rows where at least one is required.
    EmptyData,
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::ArityMismatch { expected, found } => {
                write!(f, "expected {} values, found {}", expected, found)
            }
            TransformError::EmptyData => write!(f, "statement has no data rows"),
        }
    }
}

impl std::error::Error for TransformError {}
