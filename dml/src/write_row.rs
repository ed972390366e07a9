//! The row-write state machine (spec.md §4.5): the hardest component here.
//! Drives a single logical insert row, possibly retried as an update or a
//! delete+insert when a duplicate key is hit, per the state diagram in
//! spec.md §4.5.

use common::session::{Session, WarningLevel, WarningSink};
use field::row::RowBuffer;
use field::StoreResult;
use storage::cursor::{ExtraHint, ReadOutcome, TableFlags, UpdateOutcome, WriteOutcome};
use storage::{Cursor, Table};

use crate::copy_info::{CopyInfo, DuplicatePolicy};
use crate::error::WriteError;

/// A row built by the caller, together with whether any `Field::store_*`
/// call that populated it escalated to an error under strict mode (spec.md
/// §8 Scenario A: "in strict mode, the statement fails with no row"). The
/// caller folds each `StoreResult` in via [`PreparedRow::record`] as it
/// stores each column.
pub struct PreparedRow {
    pub row: RowBuffer,
    strict_violation: Option<StoreResult>,
}

impl PreparedRow {
    pub fn new(row: RowBuffer) -> Self {
        PreparedRow { row, strict_violation: None }
    }

    /// Folds in one column's store outcome. `strict` is the same flag passed
    /// to the `Field::store_*` call that produced `result`. The first
    /// strict-mode violation wins; later columns don't overwrite it.
    pub fn record(&mut self, result: StoreResult, strict: bool) -> StoreResult {
        if strict && !result.is_silent() && self.strict_violation.is_none() {
            self.strict_violation = Some(result);
        }
        result
    }
}

/// Cooperative-cancellation hook (spec.md §5 "Cancellation"): checked at
/// the top of the bulk-insert row loop and the duplicate-retry loop.
pub trait Cancellation {
    fn is_killed(&self) -> bool;
}

/// The default: never cancelled. Used by callers (tests, `cdc-core-demo`)
/// that don't model a KILL-able session.
pub struct NeverCancelled;

impl Cancellation for NeverCancelled {
    fn is_killed(&self) -> bool {
        false
    }
}

const KILLED: &str = "query killed";

/// Bulk-insert entry point (spec.md §4.5 "Bulk-insert framing"): brackets
/// the whole row sequence with `begin_bulk_insert`/`end_bulk_insert`,
/// drives each row through [`write_one_row`], and restores the table's
/// column bitmaps on every exit path, including error.
pub fn bulk_insert_rows(
    table: &mut Table,
    cursor: &mut dyn Cursor,
    session: &mut Session,
    info: &mut CopyInfo,
    rows: impl IntoIterator<Item = PreparedRow>,
    row_hint: usize,
    cancel: &dyn Cancellation,
) -> Result<(), WriteError> {
    let saved_bitmaps = table.save_column_bitmaps();
    set_extra_hints(cursor, info.policy, true);
    cursor.begin_bulk_insert(row_hint);

    let result = (|| {
        for prepared in rows {
            if cancel.is_killed() {
                return Err(WriteError::Fatal(KILLED.to_string()));
            }
            info.records += 1;
            if let Some(result) = prepared.strict_violation {
                if let Some(err) = result.to_field_error() {
                    return Err(WriteError::Field(err));
                }
            }
            table.row = prepared.row;
            write_one_row(table, cursor, session, info, cancel)?;
        }
        Ok(())
    })();

    // Every exit path -- success, duplicate error, fatal, kill -- tears
    // down bulk-insert state and restores the bitmaps (spec.md §4.5).
    let end_result = cursor.end_bulk_insert().map_err(WriteError::Fatal);
    set_extra_hints(cursor, info.policy, false);
    table.restore_column_bitmaps(saved_bitmaps);

    result.and(end_result)
}

fn set_extra_hints(cursor: &mut dyn Cursor, policy: DuplicatePolicy, entering: bool) {
    let hint = match (policy, entering) {
        (DuplicatePolicy::Replace, true) => ExtraHint::WriteCanReplace,
        (DuplicatePolicy::Replace, false) => ExtraHint::EndWriteCanReplace,
        (DuplicatePolicy::Update, true) => ExtraHint::InsertWithUpdate,
        (DuplicatePolicy::Update, false) => ExtraHint::EndInsertWithUpdate,
        (DuplicatePolicy::Ignore, true) => ExtraHint::IgnoreDupKey,
        (DuplicatePolicy::Ignore, false) => ExtraHint::EndIgnoreDupKey,
        (DuplicatePolicy::Error, _) => return,
    };
    cursor.extra(hint);
}

/// One full pass of the TRY_WRITE / ON_DUPLICATE state diagram (spec.md
/// §4.5) for the row currently sitting in `table.row`.
fn write_one_row(
    table: &mut Table,
    cursor: &mut dyn Cursor,
    session: &mut Session,
    info: &mut CopyInfo,
    cancel: &dyn Cancellation,
) -> Result<(), WriteError> {
    let reserved_id = reserve_auto_increment_if_needed(table, cursor, session);

    loop {
        if cancel.is_killed() {
            if reserved_id.is_some() {
                cursor.release_auto_increment();
            }
            return Err(WriteError::Fatal(KILLED.to_string()));
        }

        match cursor.write_row(&table.row) {
            WriteOutcome::Ok => {
                info.copied += 1;
                if let Some(id) = reserved_id {
                    session.record_first_successful_insert_id_in_cur_stmt(id);
                }
                return Ok(());
            }
            WriteOutcome::Fatal(e) => {
                if reserved_id.is_some() {
                    cursor.release_auto_increment();
                }
                return Err(WriteError::Fatal(e));
            }
            WriteOutcome::DuplicateKey { key_index } => match info.policy {
                DuplicatePolicy::Error => {
                    if reserved_id.is_some() {
                        cursor.release_auto_increment();
                    }
                    return Err(WriteError::DuplicateKey { key_index });
                }
                DuplicatePolicy::Ignore => {
                    session.push_warning(WarningLevel::Note, "ER_DUP_ENTRY", "duplicate entry, row ignored");
                    session.bump_cuted_fields();
                    if reserved_id.is_some() {
                        cursor.release_auto_increment();
                    }
                    return Ok(());
                }
                DuplicatePolicy::Replace => {
                    table.set_full_column_bitmaps();
                    match replace_conflicting_row(table, cursor, key_index)? {
                        ReplaceOutcome::Retry => continue,
                        ReplaceOutcome::Done { copied, deleted, touched } => {
                            info.copied += copied;
                            info.deleted += deleted;
                            info.touched += touched;
                            if copied > 0 {
                                if let Some(id) = reserved_id {
                                    session.record_first_successful_insert_id_in_cur_stmt(id);
                                }
                            } else if reserved_id.is_some() {
                                cursor.release_auto_increment();
                            }
                            return Ok(());
                        }
                    }
                }
                DuplicatePolicy::Update => {
                    table.set_full_column_bitmaps();
                    update_conflicting_row(table, cursor, session, info, key_index)?;
                    // UPDATE never loops: it produces at most one mutation
                    // (spec.md §4.5). The reservation was never consumed.
                    if reserved_id.is_some() {
                        cursor.release_auto_increment();
                    }
                    return Ok(());
                }
            },
        }
    }
}

fn reserve_auto_increment_if_needed(table: &mut Table, cursor: &mut dyn Cursor, session: &mut Session) -> Option<i64> {
    let idx = table.auto_increment_field?;
    let field = &table.fields[idx];
    let is_null_or_zero = field.is_null(&table.row)
        || (field.val_int(&table.row) == 0 && !session.options().no_auto_value_on_zero);
    if !is_null_or_zero {
        return None;
    }
    let id = cursor.reserve_auto_increment();
    let strict = session.options().is_strict();
    table.fields[idx].store_str(&mut table.row, &id.to_string(), session, strict);
    Some(id)
}

enum ReplaceOutcome {
    Retry,
    Done { copied: u64, deleted: u64, touched: u64 },
}

/// The REPLACE branch (spec.md §4.5): in-place update when the engine
/// supports it and no foreign key references the row, otherwise
/// delete-then-retry-write.
fn replace_conflicting_row(table: &mut Table, cursor: &mut dyn Cursor, key_index: usize) -> Result<ReplaceOutcome, WriteError> {
    let key_bytes = table.key_bytes(key_index);
    let mut existing = table.blank_row();
    match cursor.index_read_idx(&mut existing, key_index, &key_bytes, true) {
        ReadOutcome::Ok => {}
        ReadOutcome::NotFound => return Err(WriteError::Fatal("duplicate key reported but row not found".to_string())),
        ReadOutcome::Fatal(e) => return Err(WriteError::Fatal(e)),
    }

    let can_in_place = cursor.table_flags().contains(TableFlags::DUPLICATE_POS) && !cursor.referenced_by_foreign_key();

    if can_in_place {
        match cursor.update_row(&existing, &table.row) {
            UpdateOutcome::Ok => Ok(ReplaceOutcome::Done { copied: 1, deleted: 1, touched: 0 }),
            UpdateOutcome::RecordIsTheSame => Ok(ReplaceOutcome::Done { copied: 0, deleted: 0, touched: 1 }),
            UpdateOutcome::Fatal(e) => Err(WriteError::Fatal(e)),
        }
    } else {
        cursor.delete_row(&existing).map_err(WriteError::Fatal)?;
        Ok(ReplaceOutcome::Retry)
    }
}

/// The UPDATE branch (spec.md §4.5): position on the conflicting row,
/// evaluate the caller's update assignments against it, and issue at most
/// one mutation.
fn update_conflicting_row(
    table: &mut Table,
    cursor: &mut dyn Cursor,
    session: &mut Session,
    info: &mut CopyInfo,
    key_index: usize,
) -> Result<(), WriteError> {
    let key_bytes = table.key_bytes(key_index);
    let mut existing = table.blank_row();
    match cursor.index_read_idx(&mut existing, key_index, &key_bytes, true) {
        ReadOutcome::Ok => {}
        ReadOutcome::NotFound => return Err(WriteError::Fatal("duplicate key reported but row not found".to_string())),
        ReadOutcome::Fatal(e) => return Err(WriteError::Fatal(e)),
    }

    let mut updated = RowBuffer::from_bytes(existing.as_bytes().to_vec(), 0);
    restore_bitmap(&mut updated, existing.null_bitmap());

    let strict = session.options().is_strict();
    for assignment in &info.update_assignments {
        table.fields[assignment.field_index].store_value(&mut updated, &assignment.value, session, strict);
    }

    if updated.as_bytes() == existing.as_bytes() && updated.null_bitmap() == existing.null_bitmap() {
        info.touched += 1;
        return Ok(());
    }

    match cursor.update_row(&existing, &updated) {
        UpdateOutcome::Ok => {
            info.updated += 1;
            info.touched += 1;
            Ok(())
        }
        UpdateOutcome::RecordIsTheSame => {
            info.touched += 1;
            Ok(())
        }
        UpdateOutcome::Fatal(e) => Err(WriteError::Fatal(e)),
    }
}

fn restore_bitmap(buf: &mut RowBuffer, bitmap: &[u8]) {
    for bit in 0..bitmap.len() * 8 {
        let byte = bit / 8;
        let mask = 1u8 << (bit % 8);
        buf.set_null(bit, bitmap[byte] & mask != 0);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use common::collation::Binary;
    use common::config::SessionConfig;
    use field::{Field, FieldKind, FieldValue};
    use storage::mock::{KeySpec, MemoryCursor};
    use std::sync::Arc;

    fn sample_table() -> Table {
        let id = Field::new("id", FieldKind::Long, 0, 4, Arc::new(Binary));
        let s = Field::new("s", FieldKind::Varchar, 4, 10, Arc::new(Binary)).with_declared_len(8);
        Table::new("t", vec![id, s], 14, 0).with_unique_key(vec![0])
    }

    fn row_with(table: &Table, id: i64, s: &str, session: &mut Session) -> RowBuffer {
        let mut row = table.blank_row();
        table.fields[0].store_str(&mut row, &id.to_string(), session, false);
        table.fields[1].store_str(&mut row, s, session, false);
        row
    }

    #[test]
    fn scenario_b_replace_deletes_then_reinserts() {
        let mut table = sample_table();
        let mut cursor = MemoryCursor::new(vec![KeySpec::new(vec![(0, 4)])], 0).with_table_flags(TableFlags::empty());
        let mut session = Session::new(SessionConfig::default());

        let initial = row_with(&table, 1, "old", &mut session);
        cursor.write_row(&initial);

        let mut info = CopyInfo::new(DuplicatePolicy::Replace);
        let new_row = row_with(&table, 1, "new", &mut session);
        bulk_insert_rows(&mut table, &mut cursor, &mut session, &mut info, vec![PreparedRow::new(new_row)], 1, &NeverCancelled).unwrap();

        assert_eq!(info.records, 1);
        assert_eq!(info.deleted, 1);
        assert_eq!(info.copied, 1);
        assert_eq!(cursor.row_count(), 1);
    }

    #[test]
    fn scenario_c_on_duplicate_key_update() {
        let mut table = sample_table();
        let mut cursor = MemoryCursor::new(vec![KeySpec::new(vec![(0, 4)])], 0);
        let mut session = Session::new(SessionConfig::default());

        let initial = row_with(&table, 1, "old", &mut session);
        cursor.write_row(&initial);

        let mut info = CopyInfo::new(DuplicatePolicy::Update).with_update_assignments(vec![crate::copy_info::UpdateAssignment {
            field_index: 1,
            value: FieldValue::Str(b"y".to_vec()),
        }]);
        let new_row = row_with(&table, 1, "x", &mut session);
        bulk_insert_rows(&mut table, &mut cursor, &mut session, &mut info, vec![PreparedRow::new(new_row)], 1, &NeverCancelled).unwrap();

        assert_eq!(info.records, 1);
        assert_eq!(info.updated, 1);
        assert_eq!(info.touched, 1);
        assert_eq!(info.copied, 0);

        let stored = &cursor.all_rows()[0];
        assert_eq!(table.fields[1].val_str(stored), b"y");
    }

    #[test]
    fn ignore_policy_swallows_duplicate_without_aborting() {
        let mut table = sample_table();
        let mut cursor = MemoryCursor::new(vec![KeySpec::new(vec![(0, 4)])], 0);
        let mut session = Session::new(SessionConfig::default());

        let initial = row_with(&table, 1, "old", &mut session);
        cursor.write_row(&initial);

        let mut info = CopyInfo::new(DuplicatePolicy::Ignore);
        let new_row = row_with(&table, 1, "new", &mut session);
        bulk_insert_rows(&mut table, &mut cursor, &mut session, &mut info, vec![PreparedRow::new(new_row)], 1, &NeverCancelled).unwrap();

        assert_eq!(info.records, 1);
        assert_eq!(info.copied, 0);
        assert_eq!(info.duplicates(), 1);
        assert_eq!(cursor.row_count(), 1);
    }

    #[test]
    fn error_policy_propagates_duplicate_key_error() {
        let mut table = sample_table();
        let mut cursor = MemoryCursor::new(vec![KeySpec::new(vec![(0, 4)])], 0);
        let mut session = Session::new(SessionConfig::default());

        let initial = row_with(&table, 1, "old", &mut session);
        cursor.write_row(&initial);

        let mut info = CopyInfo::new(DuplicatePolicy::Error);
        let new_row = row_with(&table, 1, "new", &mut session);
        let result = bulk_insert_rows(&mut table, &mut cursor, &mut session, &mut info, vec![PreparedRow::new(new_row)], 1, &NeverCancelled);
        assert_eq!(result, Err(WriteError::DuplicateKey { key_index: 0 }));
    }

    #[test]
    fn auto_increment_reservation_becomes_last_insert_id() {
        let id_field = Field::new("id", FieldKind::Long, 0, 4, Arc::new(Binary));
        let mut table = Table::new("t", vec![id_field], 4, 0).with_auto_increment_field(0);
        let mut cursor = MemoryCursor::new(vec![], 0);
        let mut session = Session::new(SessionConfig::default());

        let mut info = CopyInfo::new(DuplicatePolicy::Error);
        let row = table.blank_row();
        bulk_insert_rows(&mut table, &mut cursor, &mut session, &mut info, vec![PreparedRow::new(row)], 1, &NeverCancelled).unwrap();

        assert_eq!(session.arg_of_last_insert_id_function(), 1);
    }

    #[test]
    fn strict_mode_store_violation_aborts_before_any_row_is_written() {
        let id = Field::new("id", FieldKind::Long, 0, 4, Arc::new(Binary));
        let mut table = Table::new("t", vec![id], 4, 0);
        let mut cursor = MemoryCursor::new(vec![], 0);
        let mut session = Session::new(SessionConfig::default());

        let mut row = table.blank_row();
        let result = table.fields[0].store_str(&mut row, "42abc", &mut session, true);
        let mut prepared = PreparedRow::new(row);
        prepared.record(result, true);

        let mut info = CopyInfo::new(DuplicatePolicy::Error);
        let result = bulk_insert_rows(&mut table, &mut cursor, &mut session, &mut info, vec![prepared], 1, &NeverCancelled);

        assert_eq!(result, Err(WriteError::Field(field::FieldError::TruncatedData)));
        assert_eq!(info.records, 1);
        assert_eq!(cursor.row_count(), 0);
    }

    struct AlwaysKilled;
    impl Cancellation for AlwaysKilled {
        fn is_killed(&self) -> bool {
            true
        }
    }

    #[test]
    fn cancellation_aborts_before_any_row_is_written() {
        let mut table = sample_table();
        let mut cursor = MemoryCursor::new(vec![KeySpec::new(vec![(0, 4)])], 0);
        let mut session = Session::new(SessionConfig::default());
        let mut info = CopyInfo::new(DuplicatePolicy::Error);
        let new_row = row_with(&table, 1, "x", &mut session);

        let result = bulk_insert_rows(&mut table, &mut cursor, &mut session, &mut info, vec![PreparedRow::new(new_row)], 1, &AlwaysKilled);
        assert!(result.is_err());
        assert_eq!(cursor.row_count(), 0);
    }
}
