//! The statement-to-SQL transformer (spec.md §4.7): turns a structured DML
//! wire record into emitted SQL text, without consulting any catalog.

pub mod error;
pub mod transformer;
pub mod wire;

pub use error::TransformError;
pub use transformer::{to_sql, Dialect};
pub use wire::{
    DdlStatement, DeleteHeader, DeleteRecord, FieldMetadata, InsertHeader, InsertRecord, LogicalType, RenderedValue,
    Statement, TableMetadata, UpdateHeader, UpdateRecord,
};
