//! `WriteError` (SPEC_FULL.md §7): wraps `field::FieldError` and adds the
//! propagated kinds that only make sense once a cursor is involved
//! (`DuplicateKey`, `Fatal`, `OutOfMemory`), in the teacher's hand-written
//! `Display`/`From` style (`common/src/err/decode_error.rs`).

use std::fmt;

use field::FieldError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    Field(FieldError),
    /// Policy is ERROR and a write hit an existing unique key (spec.md §7).
    DuplicateKey { key_index: usize },
    /// An engine call failed outright; the caller must abort the row and
    /// the statement (spec.md §7).
    Fatal(String),
    OutOfMemory,
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::Field(e) => write!(f, "{}", e),
            WriteError::DuplicateKey { key_index } => write!(f, "duplicate entry for key {}", key_index),
            WriteError::Fatal(msg) => write!(f, "{}", msg),
            WriteError::OutOfMemory => write!(f, "out of memory"),
        }
    }
}

impl std::error::Error for WriteError {}

impl From<FieldError> for WriteError {
    fn from(err: FieldError) -> Self {
        WriteError::Field(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn duplicate_key_formats_with_its_index() {
        let err = WriteError::DuplicateKey { key_index: 2 };
        assert_eq!(err.to_string(), "duplicate entry for key 2");
    }
}
