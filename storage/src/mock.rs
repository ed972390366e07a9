//! `MemoryCursor`: a small in-process reference engine implementing
//! [`Cursor`], used by this workspace's own tests and by `cdc-core-demo`
//! in place of a real storage engine (spec.md §1 non-goal: "the
//! storage-engine implementations themselves").

use std::collections::HashMap;

use field::row::RowBuffer;

use crate::cursor::{Cursor, ExtraHint, ReadOutcome, TableFlags, UpdateOutcome, WriteOutcome};

/// One unique key, expressed as byte ranges into the packed row -- mirrors
/// `Table::unique_keys` but at the byte level a storage engine actually
/// sees, with no knowledge of `Field`.
#[derive(Debug, Clone)]
pub struct KeySpec {
    pub ranges: Vec<(usize, usize)>,
}

impl KeySpec {
    pub fn new(ranges: Vec<(usize, usize)>) -> Self {
        KeySpec { ranges }
    }

    fn extract(&self, row: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        for &(offset, len) in &self.ranges {
            out.extend_from_slice(&row[offset..offset + len]);
        }
        out
    }
}

struct StoredRow {
    data: Vec<u8>,
    null_bitmap: Vec<u8>,
}

/// An in-memory engine: rows keyed by an ever-increasing id (never reused,
/// so deletes never invalidate another row's identity), plus one hash index
/// per declared unique key.
pub struct MemoryCursor {
    rows: HashMap<u64, StoredRow>,
    next_row_id: u64,
    unique_keys: Vec<KeySpec>,
    indexes: Vec<HashMap<Vec<u8>, u64>>,
    nullable_count: usize,

    bulk_insert: bool,
    extra_log: Vec<ExtraHint>,
    auto_increment_next: i64,
    auto_increment_reserved: Vec<i64>,

    has_transactions: bool,
    referenced_by_foreign_key: bool,
    table_flags: TableFlags,
}

impl MemoryCursor {
    pub fn new(unique_keys: Vec<KeySpec>, nullable_count: usize) -> Self {
        let n = unique_keys.len();
        MemoryCursor {
            rows: HashMap::new(),
            next_row_id: 0,
            unique_keys,
            indexes: vec![HashMap::new(); n],
            nullable_count,
            bulk_insert: false,
            extra_log: Vec::new(),
            auto_increment_next: 1,
            auto_increment_reserved: Vec::new(),
            has_transactions: true,
            referenced_by_foreign_key: false,
            table_flags: TableFlags::DUPLICATE_POS,
        }
    }

    pub fn with_has_transactions(mut self, v: bool) -> Self {
        self.has_transactions = v;
        self
    }

    pub fn with_referenced_by_foreign_key(mut self, v: bool) -> Self {
        self.referenced_by_foreign_key = v;
        self
    }

    pub fn with_table_flags(mut self, flags: TableFlags) -> Self {
        self.table_flags = flags;
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_bulk_inserting(&self) -> bool {
        self.bulk_insert
    }

    pub fn extra_log(&self) -> &[ExtraHint] {
        &self.extra_log
    }

    /// Reads back every stored row, in insertion (row-id) order -- used by
    /// tests/demos to inspect the resulting table state.
    pub fn all_rows(&self) -> Vec<RowBuffer> {
        let mut ids: Vec<&u64> = self.rows.keys().collect();
        ids.sort();
        ids.into_iter()
            .map(|id| {
                let r = &self.rows[id];
                let mut buf = RowBuffer::from_bytes(r.data.clone(), self.nullable_count);
                // `RowBuffer::from_bytes` starts with an all-clear null
                // bitmap; restore the stored one bit-for-bit.
                restore_null_bitmap(&mut buf, &r.null_bitmap);
                buf
            })
            .collect()
    }

    fn find_row_id_by_exact_bytes(&self, buf: &RowBuffer) -> Option<u64> {
        self.rows
            .iter()
            .find(|(_, r)| r.data == buf.as_bytes() && r.null_bitmap == buf.null_bitmap())
            .map(|(&id, _)| id)
    }
}

fn restore_null_bitmap(buf: &mut RowBuffer, bitmap: &[u8]) {
    for bit in 0..bitmap.len() * 8 {
        let byte = bit / 8;
        let mask = 1u8 << (bit % 8);
        buf.set_null(bit, bitmap[byte] & mask != 0);
    }
}

impl Cursor for MemoryCursor {
    fn begin_bulk_insert(&mut self, _row_hint: usize) {
        self.bulk_insert = true;
    }

    fn end_bulk_insert(&mut self) -> Result<(), String> {
        self.bulk_insert = false;
        Ok(())
    }

    fn write_row(&mut self, buf: &RowBuffer) -> WriteOutcome {
        for (key_nr, spec) in self.unique_keys.iter().enumerate() {
            let probe = spec.extract(buf.as_bytes());
            if self.indexes[key_nr].contains_key(&probe) {
                return WriteOutcome::DuplicateKey { key_index: key_nr };
            }
        }

        let id = self.next_row_id;
        self.next_row_id += 1;
        for (key_nr, spec) in self.unique_keys.iter().enumerate() {
            let probe = spec.extract(buf.as_bytes());
            self.indexes[key_nr].insert(probe, id);
        }
        self.rows.insert(
            id,
            StoredRow {
                data: buf.as_bytes().to_vec(),
                null_bitmap: buf.null_bitmap().to_vec(),
            },
        );
        WriteOutcome::Ok
    }

    fn update_row(&mut self, old_buf: &RowBuffer, new_buf: &RowBuffer) -> UpdateOutcome {
        let id = match self.find_row_id_by_exact_bytes(old_buf) {
            Some(id) => id,
            None => return UpdateOutcome::Fatal("update_row: no matching row".to_string()),
        };

        if old_buf.as_bytes() == new_buf.as_bytes() && old_buf.null_bitmap() == new_buf.null_bitmap() {
            return UpdateOutcome::RecordIsTheSame;
        }

        for (key_nr, spec) in self.unique_keys.iter().enumerate() {
            let old_key = spec.extract(old_buf.as_bytes());
            self.indexes[key_nr].remove(&old_key);
            let new_key = spec.extract(new_buf.as_bytes());
            self.indexes[key_nr].insert(new_key, id);
        }
        self.rows.insert(
            id,
            StoredRow {
                data: new_buf.as_bytes().to_vec(),
                null_bitmap: new_buf.null_bitmap().to_vec(),
            },
        );
        UpdateOutcome::Ok
    }

    fn delete_row(&mut self, buf: &RowBuffer) -> Result<(), String> {
        let id = self
            .find_row_id_by_exact_bytes(buf)
            .ok_or_else(|| "delete_row: no matching row".to_string())?;
        let row = self.rows.remove(&id).expect("id came from self.rows");
        for (key_nr, spec) in self.unique_keys.iter().enumerate() {
            let key = spec.extract(&row.data);
            self.indexes[key_nr].remove(&key);
        }
        Ok(())
    }

    fn index_read_idx(&mut self, out_buf: &mut RowBuffer, key_nr: usize, key_bytes: &[u8], _exact: bool) -> ReadOutcome {
        let id = match self.indexes.get(key_nr).and_then(|m| m.get(key_bytes)) {
            Some(&id) => id,
            None => return ReadOutcome::NotFound,
        };
        let row = &self.rows[&id];
        out_buf.write(0, &row.data);
        restore_null_bitmap(out_buf, &row.null_bitmap);
        ReadOutcome::Ok
    }

    fn rnd_pos(&mut self, out_buf: &mut RowBuffer, row_ref: &[u8]) -> ReadOutcome {
        if row_ref.len() != 8 {
            return ReadOutcome::Fatal("rnd_pos: malformed row reference".to_string());
        }
        let id = u64::from_le_bytes(row_ref.try_into().unwrap());
        match self.rows.get(&id) {
            Some(row) => {
                out_buf.write(0, &row.data);
                restore_null_bitmap(out_buf, &row.null_bitmap);
                ReadOutcome::Ok
            }
            None => ReadOutcome::NotFound,
        }
    }

    fn extra(&mut self, hint: ExtraHint) {
        self.extra_log.push(hint);
    }

    fn reserve_auto_increment(&mut self) -> i64 {
        let id = self.auto_increment_next;
        self.auto_increment_next += 1;
        self.auto_increment_reserved.push(id);
        id
    }

    fn release_auto_increment(&mut self) {
        self.auto_increment_reserved.pop();
    }

    fn has_transactions(&self) -> bool {
        self.has_transactions
    }

    fn referenced_by_foreign_key(&self) -> bool {
        self.referenced_by_foreign_key
    }

    fn table_flags(&self) -> TableFlags {
        self.table_flags
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn row(bytes: &[u8]) -> RowBuffer {
        RowBuffer::from_bytes(bytes.to_vec(), 0)
    }

    #[test]
    fn write_row_detects_duplicate_on_unique_key() {
        let mut cursor = MemoryCursor::new(vec![KeySpec::new(vec![(0, 4)])], 0);
        assert_eq!(cursor.write_row(&row(&1i32.to_le_bytes())), WriteOutcome::Ok);
        assert_eq!(
            cursor.write_row(&row(&1i32.to_le_bytes())),
            WriteOutcome::DuplicateKey { key_index: 0 }
        );
    }

    #[test]
    fn index_read_idx_finds_the_conflicting_row() {
        let mut cursor = MemoryCursor::new(vec![KeySpec::new(vec![(0, 4)])], 0);
        cursor.write_row(&row(&1i32.to_le_bytes()));
        let mut out = RowBuffer::new(4, 0);
        let outcome = cursor.index_read_idx(&mut out, 0, &1i32.to_le_bytes(), true);
        assert_eq!(outcome, ReadOutcome::Ok);
        assert_eq!(out.as_bytes(), &1i32.to_le_bytes());
    }

    #[test]
    fn update_row_reports_record_is_the_same() {
        let mut cursor = MemoryCursor::new(vec![], 0);
        let r = row(&1i32.to_le_bytes());
        cursor.write_row(&r);
        assert_eq!(cursor.update_row(&r, &r), UpdateOutcome::RecordIsTheSame);
    }

    #[test]
    fn delete_row_removes_from_index() {
        let mut cursor = MemoryCursor::new(vec![KeySpec::new(vec![(0, 4)])], 0);
        let r = row(&1i32.to_le_bytes());
        cursor.write_row(&r);
        cursor.delete_row(&r).unwrap();
        assert_eq!(cursor.write_row(&r), WriteOutcome::Ok);
    }

    #[test]
    fn auto_increment_release_undoes_the_reservation() {
        let mut cursor = MemoryCursor::new(vec![], 0);
        let first = cursor.reserve_auto_increment();
        cursor.release_auto_increment();
        let second = cursor.reserve_auto_increment();
        assert_eq!(first, second);
    }
}
