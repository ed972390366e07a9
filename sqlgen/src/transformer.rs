//! `to_sql`: consumes a [`crate::wire::Statement`] and renders SQL text
//! (spec.md §4.7). Pure -- it never consults a catalog, everything it needs
//! travels in the header.

use common::strbuf::StringBuffer;

use crate::error::TransformError;
use crate::wire::{
    DdlStatement, DeleteHeader, DeleteRecord, FieldMetadata, InsertHeader, InsertRecord, LogicalType, RenderedValue,
    Statement, TableMetadata, UpdateHeader, UpdateRecord,
};

/// Identifier quoting style (spec.md §4.7): back-tick for native, double
/// quote for ANSI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Native,
    Ansi,
}

impl Dialect {
    fn quote_char(self) -> char {
        match self {
            Dialect::Native => '`',
            Dialect::Ansi => '"',
        }
    }
}

fn quote_ident(dialect: Dialect, ident: &str) -> String {
    let q = dialect.quote_char();
    let mut out = String::with_capacity(ident.len() + 2);
    out.push(q);
    for c in ident.chars() {
        if c == q {
            out.push(q);
            out.push(q);
        } else {
            out.push(c);
        }
    }
    out.push(q);
    out
}

fn quote_qualified(dialect: Dialect, table: &TableMetadata) -> String {
    format!(
        "{}.{}",
        quote_ident(dialect, &table.schema_name),
        quote_ident(dialect, &table.table_name)
    )
}

/// Renders one [`RenderedValue`] per the field's logical type (spec.md
/// §4.7): numeric/ENUM unquoted, BLOB single-quoted with its raw bytes
/// appended by explicit length rather than escaped (`statement_transform.cc`
/// quotes a BLOB and appends its data by length, since a NUL byte would
/// otherwise truncate it), everything else single-quoted and escaped.
fn render_value(value: &RenderedValue, is_null: bool, field: &FieldMetadata) -> String {
    if is_null {
        return "NULL".to_string();
    }
    match value {
        RenderedValue::Bytes(bytes) => {
            let mut out = String::with_capacity(bytes.len() + 2);
            out.push('\'');
            out.push_str(&String::from_utf8_lossy(bytes));
            out.push('\'');
            out
        }
        RenderedValue::Text(text) => {
            if field.logical_type.is_unquoted() {
                text.clone()
            } else {
                String::from_utf8_lossy(&StringBuffer::escape(text.as_bytes(), b'\'')).into_owned()
            }
        }
    }
}

fn transaction_wrap(dialect: Dialect, statements: Vec<String>, already_in_transaction: bool) -> String {
    if statements.len() <= 1 || already_in_transaction {
        return statements.join("\n");
    }
    let _ = dialect;
    let mut out = String::from("START TRANSACTION;\n");
    out.push_str(&statements.join("\n"));
    out.push_str("\nCOMMIT;");
    out
}

fn render_insert(dialect: Dialect, header: &InsertHeader, data: &[InsertRecord]) -> Result<String, TransformError> {
    if data.is_empty() {
        return Err(TransformError::EmptyData);
    }
    let table = quote_qualified(dialect, &header.table);
    let columns: Vec<String> = header.fields.iter().map(|f| quote_ident(dialect, &f.name)).collect();
    let columns_sql = columns.join(",");

    let mut statements = Vec::with_capacity(data.len());
    for record in data {
        if record.insert_value.len() != header.fields.len() || record.is_null.len() != header.fields.len() {
            return Err(TransformError::ArityMismatch {
                expected: header.fields.len(),
                found: record.insert_value.len(),
            });
        }
        let values: Vec<String> = record
            .insert_value
            .iter()
            .zip(&record.is_null)
            .zip(&header.fields)
            .map(|((v, &is_null), f)| render_value(v, is_null, f))
            .collect();
        statements.push(format!("INSERT INTO {} ({}) VALUES ({})", table, columns_sql, values.join(",")));
    }
    Ok(statements.join("\n"))
}

fn render_update(dialect: Dialect, header: &UpdateHeader, data: &[UpdateRecord]) -> Result<String, TransformError> {
    if data.is_empty() {
        return Err(TransformError::EmptyData);
    }
    let table = quote_qualified(dialect, &header.table);

    let mut statements = Vec::with_capacity(data.len());
    for record in data {
        if record.after_value.len() != header.set_field_metadata.len() || record.is_null.len() != header.set_field_metadata.len()
        {
            return Err(TransformError::ArityMismatch {
                expected: header.set_field_metadata.len(),
                found: record.after_value.len(),
            });
        }
        if record.key_value.len() != header.key_field_metadata.len() {
            return Err(TransformError::ArityMismatch {
                expected: header.key_field_metadata.len(),
                found: record.key_value.len(),
            });
        }

        let assignments: Vec<String> = record
            .after_value
            .iter()
            .zip(&record.is_null)
            .zip(&header.set_field_metadata)
            .map(|((v, &is_null), f)| format!("{}={}", quote_ident(dialect, &f.name), render_value(v, is_null, f)))
            .collect();

        let predicates: Vec<String> = record
            .key_value
            .iter()
            .zip(&header.key_field_metadata)
            .map(|(v, f)| format!("{}={}", quote_ident(dialect, &f.name), render_value(v, false, f)))
            .collect();

        statements.push(format!(
            "UPDATE {} SET {} WHERE {}",
            table,
            assignments.join(","),
            predicates.join(" AND ")
        ));
    }
    Ok(statements.join("\n"))
}

fn render_delete(dialect: Dialect, header: &DeleteHeader, data: &[DeleteRecord]) -> Result<String, TransformError> {
    if data.is_empty() {
        return Err(TransformError::EmptyData);
    }
    let table = quote_qualified(dialect, &header.table);
    let composite = header.key_field_metadata.len() > 1;

    let mut clauses = Vec::with_capacity(data.len());
    for record in data {
        if record.key_value.len() != header.key_field_metadata.len() {
            return Err(TransformError::ArityMismatch {
                expected: header.key_field_metadata.len(),
                found: record.key_value.len(),
            });
        }
        let predicates: Vec<String> = record
            .key_value
            .iter()
            .zip(&header.key_field_metadata)
            .map(|(v, f)| format!("{}={}", quote_ident(dialect, &f.name), render_value(v, false, f)))
            .collect();
        let tuple = predicates.join(" AND ");
        clauses.push(if composite { format!("({})", tuple) } else { tuple });
    }
    Ok(format!("DELETE FROM {} WHERE {}", table, clauses.join(" OR ")))
}

fn render_ddl(dialect: Dialect, ddl: &DdlStatement) -> String {
    match ddl {
        DdlStatement::CreateTable { table, fields, if_not_exists } => {
            let cols: Vec<String> = fields.iter().map(|f| quote_ident(dialect, &f.name)).collect();
            format!(
                "CREATE TABLE{} {} ({})",
                if *if_not_exists { " IF NOT EXISTS" } else { "" },
                quote_qualified(dialect, table),
                cols.join(",")
            )
        }
        DdlStatement::Truncate { table } => format!("TRUNCATE TABLE {}", quote_qualified(dialect, table)),
        DdlStatement::DropTable { table, if_exists } => format!(
            "DROP TABLE{} {}",
            if *if_exists { " IF EXISTS" } else { "" },
            quote_qualified(dialect, table)
        ),
        DdlStatement::CreateSchema { schema_name, if_not_exists } => format!(
            "CREATE SCHEMA{} {}",
            if *if_not_exists { " IF NOT EXISTS" } else { "" },
            quote_ident(dialect, schema_name)
        ),
        DdlStatement::DropSchema { schema_name, if_exists } => format!(
            "DROP SCHEMA{} {}",
            if *if_exists { " IF EXISTS" } else { "" },
            quote_ident(dialect, schema_name)
        ),
        DdlStatement::SetVariable { name, value } => format!("SET {} = {}", name, value),
        DdlStatement::Raw(sql) => sql.clone(),
    }
}

/// Renders one [`Statement`] to SQL text (spec.md §4.7). Multi-row data
/// segments are bracketed with `START TRANSACTION`/`COMMIT` unless the
/// caller states it is already inside a transaction.
pub fn to_sql(stmt: &Statement, dialect: Dialect, already_in_transaction: bool) -> Result<String, TransformError> {
    match stmt {
        Statement::Insert { header, data, .. } => {
            let body = render_insert(dialect, header, data)?;
            Ok(transaction_wrap(dialect, body.lines().map(str::to_string).collect(), already_in_transaction))
        }
        Statement::Update { header, data, .. } => {
            let body = render_update(dialect, header, data)?;
            Ok(transaction_wrap(dialect, body.lines().map(str::to_string).collect(), already_in_transaction))
        }
        Statement::Delete { header, data, .. } => render_delete(dialect, header, data),
        Statement::Ddl(ddl) => Ok(render_ddl(dialect, ddl)),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn scenario_e_insert_renders_native_dialect() {
        let stmt = Statement::Insert {
            header: InsertHeader {
                table: TableMetadata {
                    schema_name: "s".to_string(),
                    table_name: "t".to_string(),
                },
                fields: vec![
                    FieldMetadata { name: "id".to_string(), logical_type: LogicalType::Int },
                    FieldMetadata { name: "v".to_string(), logical_type: LogicalType::Varchar },
                ],
            },
            data: vec![InsertRecord {
                is_null: vec![false, false],
                insert_value: vec![RenderedValue::Text("7".to_string()), RenderedValue::Text("hi".to_string())],
            }],
            segment_id: 1,
        };

        let sql = to_sql(&stmt, Dialect::Native, false).unwrap();
        assert_eq!(sql, "INSERT INTO `s`.`t` (`id`,`v`) VALUES (7,'hi')");
    }

    #[test]
    fn ansi_dialect_uses_double_quotes() {
        let stmt = Statement::Ddl(DdlStatement::Truncate {
            table: TableMetadata { schema_name: "s".to_string(), table_name: "t".to_string() },
        });
        assert_eq!(to_sql(&stmt, Dialect::Ansi, false).unwrap(), r#"TRUNCATE TABLE "s"."t""#);
    }

    #[test]
    fn multi_row_insert_is_bracketed_in_a_transaction() {
        let header = InsertHeader {
            table: TableMetadata { schema_name: "s".to_string(), table_name: "t".to_string() },
            fields: vec![FieldMetadata { name: "id".to_string(), logical_type: LogicalType::Int }],
        };
        let data = vec![
            InsertRecord { is_null: vec![false], insert_value: vec![RenderedValue::Text("1".to_string())] },
            InsertRecord { is_null: vec![false], insert_value: vec![RenderedValue::Text("2".to_string())] },
        ];
        let stmt = Statement::Insert { header, data, segment_id: 1 };

        let sql = to_sql(&stmt, Dialect::Native, false).unwrap();
        assert!(sql.starts_with("START TRANSACTION;\n"));
        assert!(sql.ends_with("\nCOMMIT;"));
    }

    #[test]
    fn already_in_transaction_skips_bracketing() {
        let header = InsertHeader {
            table: TableMetadata { schema_name: "s".to_string(), table_name: "t".to_string() },
            fields: vec![FieldMetadata { name: "id".to_string(), logical_type: LogicalType::Int }],
        };
        let data = vec![
            InsertRecord { is_null: vec![false], insert_value: vec![RenderedValue::Text("1".to_string())] },
            InsertRecord { is_null: vec![false], insert_value: vec![RenderedValue::Text("2".to_string())] },
        ];
        let stmt = Statement::Insert { header, data, segment_id: 1 };

        let sql = to_sql(&stmt, Dialect::Native, true).unwrap();
        assert!(!sql.contains("START TRANSACTION"));
    }

    #[test]
    fn composite_key_delete_parenthesizes_each_tuple() {
        let header = DeleteHeader {
            table: TableMetadata { schema_name: "s".to_string(), table_name: "t".to_string() },
            key_field_metadata: vec![
                FieldMetadata { name: "a".to_string(), logical_type: LogicalType::Int },
                FieldMetadata { name: "b".to_string(), logical_type: LogicalType::Int },
            ],
        };
        let data = vec![
            DeleteRecord { key_value: vec![RenderedValue::Text("1".to_string()), RenderedValue::Text("2".to_string())] },
            DeleteRecord { key_value: vec![RenderedValue::Text("3".to_string()), RenderedValue::Text("4".to_string())] },
        ];
        let stmt = Statement::Delete { header, data, segment_id: 1 };

        let sql = to_sql(&stmt, Dialect::Native, false).unwrap();
        assert_eq!(sql, "DELETE FROM `s`.`t` WHERE (`a`=1 AND `b`=2) OR (`a`=3 AND `b`=4)");
    }

    #[test]
    fn null_value_renders_as_null_keyword_regardless_of_type() {
        let field = FieldMetadata { name: "v".to_string(), logical_type: LogicalType::Varchar };
        assert_eq!(render_value(&RenderedValue::Text("ignored".to_string()), true, &field), "NULL");
    }

    #[test]
    fn blob_value_renders_quoted_with_raw_bytes_by_length() {
        let field = FieldMetadata { name: "v".to_string(), logical_type: LogicalType::Blob };
        assert_eq!(render_value(&RenderedValue::Bytes(b"ab\0cd".to_vec()), false, &field), "'ab\0cd'");
    }

    #[test]
    fn blob_value_is_not_escaped_unlike_text() {
        let field = FieldMetadata { name: "v".to_string(), logical_type: LogicalType::Blob };
        // A raw quote byte passes through unescaped, since BLOB data is
        // appended by explicit length, not quote-doubled like TEXT.
        assert_eq!(render_value(&RenderedValue::Bytes(b"o'brien".to_vec()), false, &field), "'o'brien'");
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        let header = InsertHeader {
            table: TableMetadata { schema_name: "s".to_string(), table_name: "t".to_string() },
            fields: vec![FieldMetadata { name: "id".to_string(), logical_type: LogicalType::Int }],
        };
        let data = vec![InsertRecord { is_null: vec![false, false], insert_value: vec![RenderedValue::Text("1".to_string())] }];
        let stmt = Statement::Insert { header, data, segment_id: 1 };
        assert!(to_sql(&stmt, Dialect::Native, false).is_err());
    }
}
