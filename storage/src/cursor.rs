//! The `Cursor` contract (spec.md §6, §2 item 11): the row-write state
//! machine calls into this but never implements it. Modeled as a plain
//! trait rather than a vtable class, per spec.md §9 REDESIGN FLAGS.

use field::row::RowBuffer;

bitflags::bitflags! {
    /// Capability bits an engine reports for itself (spec.md §6).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TableFlags: u32 {
        /// The engine can hand the row-writer a duplicate row's position
        /// directly, enabling REPLACE's in-place-update fast path (spec.md §4.5).
        const DUPLICATE_POS = 0b01;
        /// The engine only materializes the read-set columns on a read,
        /// rather than the full row.
        const PARTIAL_COLUMN_READ = 0b10;
    }
}

/// Outcome of `Cursor::write_row` (spec.md §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Ok,
    DuplicateKey { key_index: usize },
    Fatal(String),
}

/// Outcome of `Cursor::update_row` (spec.md §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Ok,
    RecordIsTheSame,
    Fatal(String),
}

/// Outcome of `Cursor::index_read_idx`/`rnd_pos` (spec.md §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Ok,
    NotFound,
    Fatal(String),
}

/// Opaque optimizer hints the row-writer passes via `Cursor::extra`
/// (spec.md §4.5's "bulk-insert framing"). Engines may ignore any of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraHint {
    WriteCanReplace,
    EndWriteCanReplace,
    InsertWithUpdate,
    EndInsertWithUpdate,
    IgnoreDupKey,
    EndIgnoreDupKey,
}

/// The storage-engine contract the row-write state machine consumes
/// (spec.md §6). Never implemented by this workspace's core logic -- only
/// by an embedding engine (or, for tests/demos, [`crate::mock::MemoryCursor`]).
pub trait Cursor {
    fn begin_bulk_insert(&mut self, row_hint: usize);
    fn end_bulk_insert(&mut self) -> Result<(), String>;

    fn write_row(&mut self, buf: &RowBuffer) -> WriteOutcome;
    fn update_row(&mut self, old_buf: &RowBuffer, new_buf: &RowBuffer) -> UpdateOutcome;
    fn delete_row(&mut self, buf: &RowBuffer) -> Result<(), String>;

    fn index_read_idx(&mut self, out_buf: &mut RowBuffer, key_nr: usize, key_bytes: &[u8], exact: bool) -> ReadOutcome;
    fn rnd_pos(&mut self, out_buf: &mut RowBuffer, row_ref: &[u8]) -> ReadOutcome;

    fn extra(&mut self, hint: ExtraHint);

    fn reserve_auto_increment(&mut self) -> i64;
    fn release_auto_increment(&mut self);

    fn has_transactions(&self) -> bool;
    fn referenced_by_foreign_key(&self) -> bool;
    fn table_flags(&self) -> TableFlags;
}
