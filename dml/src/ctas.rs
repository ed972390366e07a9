//! CREATE-TABLE-AS-SELECT bridge (spec.md §4.6): widens the SELECT leg's
//! projected columns through the type-merge lattice, creates the new table
//! via a storage factory, and drives the incoming rows through the row-write
//! state machine.

use field::row::RowBuffer;
use field::{merge, Field, FieldKind};
use storage::{Cursor, Table};

use crate::copy_info::{CopyInfo, DuplicatePolicy};
use crate::error::WriteError;
use crate::write_row::{bulk_insert_rows, Cancellation, NeverCancelled, PreparedRow};
use common::session::Session;

/// One column projected by a SELECT leg, already reduced across every row
/// seen so far via [`widen_projected_kind`] -- the caller folds this as rows
/// stream in, since CTAS never materializes the whole result set up front.
#[derive(Debug, Clone)]
pub struct ProjectedColumn {
    pub name: String,
    pub kind: FieldKind,
    pub len: usize,
    pub nullable: bool,
}

/// Folds one more observed column kind into the running projection
/// (spec.md §4.6 step 1: "synthesize ... using the type-merge lattice to
/// widen across rows, e.g. INT + DOUBLE ⇒ DOUBLE").
pub fn widen_projected_kind(acc: FieldKind, observed: FieldKind) -> FieldKind {
    merge(acc, observed)
}

/// The narrow surface CTAS needs from the storage layer to create (and, on
/// abort, drop) the destination table (spec.md §4.6 step 2 and step 4).
/// Implemented by the embedding engine, analogous to `Cursor`.
pub trait StorageFactory {
    fn create_table(&mut self, name: &str, columns: &[ProjectedColumn]) -> Result<(), String>;
    fn drop_table(&mut self, name: &str) -> Result<(), String>;
}

/// Drives a CREATE-TABLE-AS-SELECT statement (spec.md §4.6). `rows` is the
/// already-evaluated SELECT result set rebound against `table`'s fields; the
/// table itself must already exist in `cursor` (created via `factory` by the
/// caller before invoking this, so steps 1-2 compose with step 3-4 here).
///
/// `created_by_this_statement` gates step 4: on abort, the new table is
/// dropped only if this statement is the one that created it -- a
/// pre-existing table (e.g. `CREATE OR REPLACE`) is never dropped.
pub fn execute_ctas(
    table: &mut Table,
    cursor: &mut dyn Cursor,
    factory: &mut dyn StorageFactory,
    session: &mut Session,
    rows: impl IntoIterator<Item = RowBuffer>,
    created_by_this_statement: bool,
) -> Result<CopyInfo, WriteError> {
    let mut info = CopyInfo::new(DuplicatePolicy::Error);
    let cancel: &dyn Cancellation = &NeverCancelled;

    let prepared = rows.into_iter().map(PreparedRow::new);
    let result = bulk_insert_rows(table, cursor, session, &mut info, prepared, 0, cancel);

    match result {
        Ok(()) => Ok(info),
        Err(err) => {
            if created_by_this_statement {
                let _ = factory.drop_table(&table.name);
            }
            Err(err)
        }
    }
}

/// Synthesizes the destination table's `Field` descriptors from a widened
/// projection list (spec.md §4.6 step 1), packing them sequentially into one
/// row buffer.
pub fn synthesize_fields(projection: &[ProjectedColumn], collation: std::sync::Arc<dyn common::collation::Collation>) -> (Vec<Field>, usize) {
    let mut offset = 0;
    let mut fields = Vec::with_capacity(projection.len());
    let mut null_bit = 0;
    for col in projection {
        let mut field = Field::new(&col.name, col.kind, offset, col.len, collation.clone());
        if col.nullable {
            field = field.with_nullable(null_bit);
            null_bit += 1;
        }
        offset += col.len;
        fields.push(field);
    }
    (fields, offset)
}

#[cfg(test)]
mod test {
    use super::*;
    use common::collation::Binary;
    use common::config::SessionConfig;
    use std::sync::Arc;

    #[test]
    fn widen_projected_kind_follows_the_merge_lattice() {
        assert_eq!(widen_projected_kind(FieldKind::Long, FieldKind::Double), FieldKind::Double);
        assert_eq!(widen_projected_kind(FieldKind::Null, FieldKind::Decimal), FieldKind::Decimal);
    }

    #[test]
    fn synthesize_fields_packs_columns_sequentially() {
        let projection = vec![
            ProjectedColumn { name: "a".to_string(), kind: FieldKind::Long, len: 4, nullable: false },
            ProjectedColumn { name: "b".to_string(), kind: FieldKind::Double, len: 8, nullable: true },
        ];
        let (fields, row_len) = synthesize_fields(&projection, Arc::new(Binary));
        assert_eq!(fields[0].offset, 0);
        assert_eq!(fields[1].offset, 4);
        assert_eq!(row_len, 12);
        assert!(fields[1].nullable);
    }

    struct NoopFactory {
        dropped: Vec<String>,
    }
    impl StorageFactory for NoopFactory {
        fn create_table(&mut self, _name: &str, _columns: &[ProjectedColumn]) -> Result<(), String> {
            Ok(())
        }
        fn drop_table(&mut self, name: &str) -> Result<(), String> {
            self.dropped.push(name.to_string());
            Ok(())
        }
    }

    #[test]
    fn abort_drops_table_only_when_this_statement_created_it() {
        let id = Field::new("id", FieldKind::Long, 0, 4, Arc::new(Binary));
        let mut table = Table::new("t", vec![id], 4, 0).with_unique_key(vec![0]);
        let mut cursor = storage::mock::MemoryCursor::new(vec![storage::mock::KeySpec::new(vec![(0, 4)])], 0);
        let mut session = Session::new(SessionConfig::default());

        let dup_row = table.blank_row();
        cursor.write_row(&dup_row);

        let mut factory = NoopFactory { dropped: Vec::new() };
        let result = execute_ctas(&mut table, &mut cursor, &mut factory, &mut session, vec![table.blank_row()], true);

        assert!(result.is_err());
        assert_eq!(factory.dropped, vec!["t".to_string()]);
    }
}
