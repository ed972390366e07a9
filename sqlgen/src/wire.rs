//! The structured DML wire record (spec.md §6): a `serde`-derived shape so
//! test fixtures can be expressed as JSON/YAML, matching the teacher's use
//! of `serde_json`/`serde_yaml` for fixture-shaped data.

use serde::{Deserialize, Serialize};

/// The logical SQL type of one field, as carried by `field_metadata` (spec.md
/// §6). Distinct from `field::FieldKind` -- this is the wire-level vocabulary
/// the transformer quotes by, not the storage-level variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalType {
    Int,
    BigInt,
    Decimal,
    Double,
    Enum,
    Varchar,
    Blob,
    Date,
    DateTime,
    Timestamp,
}

impl LogicalType {
    /// Numeric and ENUM values are emitted unquoted (spec.md §4.7).
    pub fn is_unquoted(self) -> bool {
        matches!(
            self,
            LogicalType::Int | LogicalType::BigInt | LogicalType::Decimal | LogicalType::Double | LogicalType::Enum
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub schema_name: String,
    pub table_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub name: String,
    pub logical_type: LogicalType,
}

/// A rendered value: already-rendered text, or raw BLOB bytes which are
/// rendered with explicit length rather than text-escaped (spec.md §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderedValue {
    Text(String),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertHeader {
    pub table: TableMetadata,
    pub fields: Vec<FieldMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertRecord {
    pub is_null: Vec<bool>,
    pub insert_value: Vec<RenderedValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateHeader {
    pub table: TableMetadata,
    pub set_field_metadata: Vec<FieldMetadata>,
    pub key_field_metadata: Vec<FieldMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRecord {
    pub is_null: Vec<bool>,
    pub after_value: Vec<RenderedValue>,
    pub key_value: Vec<RenderedValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteHeader {
    pub table: TableMetadata,
    pub key_field_metadata: Vec<FieldMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteRecord {
    pub key_value: Vec<RenderedValue>,
}

/// Non-DML statement shapes (spec.md §4.7's "plus schema DDL"), grounded on
/// `statement_transform.cc`'s `switch` over `Statement::type()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DdlStatement {
    CreateTable {
        table: TableMetadata,
        fields: Vec<FieldMetadata>,
        if_not_exists: bool,
    },
    Truncate {
        table: TableMetadata,
    },
    DropTable {
        table: TableMetadata,
        if_exists: bool,
    },
    CreateSchema {
        schema_name: String,
        if_not_exists: bool,
    },
    DropSchema {
        schema_name: String,
        if_exists: bool,
    },
    SetVariable {
        name: String,
        value: String,
    },
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Insert {
        header: InsertHeader,
        data: Vec<InsertRecord>,
        segment_id: u32,
    },
    Update {
        header: UpdateHeader,
        data: Vec<UpdateRecord>,
        segment_id: u32,
    },
    Delete {
        header: DeleteHeader,
        data: Vec<DeleteRecord>,
        segment_id: u32,
    },
    Ddl(DdlStatement),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn insert_statement_round_trips_through_json() {
        let stmt = Statement::Insert {
            header: InsertHeader {
                table: TableMetadata {
                    schema_name: "s".to_string(),
                    table_name: "t".to_string(),
                },
                fields: vec![FieldMetadata {
                    name: "id".to_string(),
                    logical_type: LogicalType::Int,
                }],
            },
            data: vec![InsertRecord {
                is_null: vec![false],
                insert_value: vec![RenderedValue::Text("7".to_string())],
            }],
            segment_id: 1,
        };
        let json = serde_json::to_string(&stmt).unwrap();
        let back: Statement = serde_json::from_str(&json).unwrap();
        assert_eq!(stmt, back);
    }
}
