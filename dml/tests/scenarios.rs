//! Scenarios B and C from spec.md §8, exercised through the public `dml`
//! crate API end to end against `storage::MemoryCursor`.

use std::sync::Arc;

use common::collation::Binary;
use common::config::SessionConfig;
use common::session::Session;
use dml::{bulk_insert_rows, CopyInfo, DuplicatePolicy, NeverCancelled, PreparedRow, UpdateAssignment};
use field::{Field, FieldKind, FieldValue};
use storage::mock::{KeySpec, MemoryCursor};
use storage::Table;

fn id_s_table() -> Table {
    let id = Field::new("id", FieldKind::Long, 0, 4, Arc::new(Binary));
    let s = Field::new("s", FieldKind::Varchar, 4, 10, Arc::new(Binary)).with_declared_len(8);
    Table::new("t", vec![id, s], 14, 0).with_unique_key(vec![0])
}

fn row(table: &Table, id: i64, s: &str, session: &mut Session) -> field::RowBuffer {
    let mut row = table.blank_row();
    table.fields[0].store_str(&mut row, &id.to_string(), session, false);
    table.fields[1].store_str(&mut row, s, session, false);
    row
}

#[test]
fn scenario_b_replace_into() {
    let mut table = id_s_table();
    let mut cursor = MemoryCursor::new(vec![KeySpec::new(vec![(0, 4)])], 0);
    let mut session = Session::new(SessionConfig::default());

    let existing = row(&table, 1, "old", &mut session);
    cursor.write_row(&existing);

    let mut info = CopyInfo::new(DuplicatePolicy::Replace);
    let incoming = row(&table, 1, "new", &mut session);
    bulk_insert_rows(&mut table, &mut cursor, &mut session, &mut info, vec![PreparedRow::new(incoming)], 1, &NeverCancelled).unwrap();

    assert_eq!(info.records, 1);
    assert_eq!(info.deleted, 1);
    assert_eq!(info.copied, 1);

    let stored = &cursor.all_rows()[0];
    assert_eq!(table.fields[1].val_str(stored), b"new");
}

#[test]
fn scenario_c_insert_on_duplicate_key_update() {
    let mut table = id_s_table();
    let mut cursor = MemoryCursor::new(vec![KeySpec::new(vec![(0, 4)])], 0);
    let mut session = Session::new(SessionConfig::default());

    let existing = row(&table, 1, "old", &mut session);
    cursor.write_row(&existing);

    let mut info = CopyInfo::new(DuplicatePolicy::Update).with_update_assignments(vec![UpdateAssignment {
        field_index: 1,
        value: FieldValue::Str(b"y".to_vec()),
    }]);
    let incoming = row(&table, 1, "x", &mut session);
    bulk_insert_rows(&mut table, &mut cursor, &mut session, &mut info, vec![PreparedRow::new(incoming)], 1, &NeverCancelled).unwrap();

    assert_eq!(info.records, 1);
    assert_eq!(info.updated, 1);
    assert_eq!(info.touched, 1);
    assert_eq!(info.copied, 0);

    let stored = &cursor.all_rows()[0];
    assert_eq!(table.fields[1].val_str(stored), b"y");
}
