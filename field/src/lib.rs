pub mod error;
pub mod field;
pub mod kind;
pub mod row;

pub use error::{FieldError, StoreResult};
pub use field::{Field, FieldValue};
pub use kind::{merge, FieldKind, ResultFamily};
pub use row::RowBuffer;
