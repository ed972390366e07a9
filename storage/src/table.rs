//! `Table`: a tuple of `Field`s bound to one shared row buffer (spec.md §2:
//! "a caller has a Session and a Table"), plus the column-bitmap and
//! auto-increment bookkeeping the row-write state machine saves/restores
//! around duplicate handling (spec.md §4.5).

use field::row::RowBuffer;
use field::Field;

/// A tuple of `Field`s over one packed row, owned by the embedding
/// statement (spec.md §3's "Lifecycle": constructed at table open,
/// destroyed at table close).
pub struct Table {
    pub name: String,
    pub fields: Vec<Field>,
    pub row: RowBuffer,
    /// Reset target for `REPLACE`/`INSERT ... ON DUPLICATE KEY UPDATE`'s
    /// pseudo-column references and for restoring a fresh row between writes.
    pub default_row: RowBuffer,
    /// One unique key per entry, each a list of field indices forming that
    /// key (spec.md §4.5's "key lookup built from the current row").
    /// Index 0 is conventionally the primary key.
    pub unique_keys: Vec<Vec<usize>>,
    /// Which columns the current statement may read/write. Saved and
    /// restored by the row-writer across duplicate handling (spec.md §4.5
    /// "Column bitmap discipline").
    pub read_set: Vec<bool>,
    pub write_set: Vec<bool>,
    pub auto_increment_field: Option<usize>,
    nullable_count: usize,
}

impl Table {
    pub fn new(name: &str, fields: Vec<Field>, row_len: usize, nullable_count: usize) -> Self {
        let n = fields.len();
        Table {
            name: name.to_string(),
            fields,
            row: RowBuffer::new(row_len, nullable_count),
            default_row: RowBuffer::new(row_len, nullable_count),
            unique_keys: Vec::new(),
            read_set: vec![true; n],
            write_set: vec![true; n],
            auto_increment_field: None,
            nullable_count,
        }
    }

    pub fn with_auto_increment_field(mut self, index: usize) -> Self {
        self.auto_increment_field = Some(index);
        self
    }

    pub fn with_unique_key(mut self, field_indices: Vec<usize>) -> Self {
        self.unique_keys.push(field_indices);
        self
    }

    pub fn blank_row(&self) -> RowBuffer {
        RowBuffer::new(self.row.len(), self.nullable_count)
    }

    pub fn find_field(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Concatenated bytes of the fields composing `unique_keys[key_index]`,
    /// read from `self.row` -- the "key lookup built from the current row"
    /// path spec.md §4.5 describes for locating a duplicate.
    pub fn key_bytes(&self, key_index: usize) -> Vec<u8> {
        let mut out = Vec::new();
        for &field_idx in &self.unique_keys[key_index] {
            let f = &self.fields[field_idx];
            out.extend_from_slice(self.row.slice(f.offset, f.len));
        }
        out
    }

    pub fn key_bytes_of(&self, key_index: usize, row: &RowBuffer) -> Vec<u8> {
        let mut out = Vec::new();
        for &field_idx in &self.unique_keys[key_index] {
            let f = &self.fields[field_idx];
            out.extend_from_slice(row.slice(f.offset, f.len));
        }
        out
    }

    /// Snapshots the current read/write bitmaps so the writer can restore
    /// them after widening them to read the full row during duplicate
    /// handling (spec.md §4.5).
    pub fn save_column_bitmaps(&self) -> (Vec<bool>, Vec<bool>) {
        (self.read_set.clone(), self.write_set.clone())
    }

    pub fn restore_column_bitmaps(&mut self, saved: (Vec<bool>, Vec<bool>)) {
        self.read_set = saved.0;
        self.write_set = saved.1;
    }

    /// Widens both bitmaps to cover every column -- duplicate handling must
    /// be able to read/evaluate against the full conflicting row (spec.md
    /// §4.5: "the full row must be read to compute update expressions").
    pub fn set_full_column_bitmaps(&mut self) {
        self.read_set.iter_mut().for_each(|b| *b = true);
        self.write_set.iter_mut().for_each(|b| *b = true);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use common::collation::Binary;
    use field::FieldKind;
    use std::sync::Arc;

    fn sample_table() -> Table {
        let id = Field::new("id", FieldKind::Long, 0, 4, Arc::new(Binary));
        let name = Field::new("name", FieldKind::Varchar, 4, 9, Arc::new(Binary)).with_declared_len(8);
        Table::new("t", vec![id, name], 13, 0).with_unique_key(vec![0])
    }

    #[test]
    fn key_bytes_reads_only_the_declared_key_fields() {
        let mut table = sample_table();
        table.fields[0].store_value(
            &mut table.row,
            &field::FieldValue::Int(42),
            &mut common::session::Session::new(common::config::SessionConfig::default()),
            false,
        );
        assert_eq!(table.key_bytes(0), 42i32.to_le_bytes().to_vec());
    }

    #[test]
    fn column_bitmap_round_trips_through_save_restore() {
        let mut table = sample_table();
        let saved = table.save_column_bitmaps();
        table.set_full_column_bitmaps();
        table.write_set[0] = false;
        table.restore_column_bitmaps(saved);
        assert!(table.write_set.iter().all(|&b| b));
    }
}
