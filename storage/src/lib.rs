//! The narrow interface the row-write state machine consumes from a storage
//! engine (spec.md §6, §2 item 11: "Interface only"), plus one in-memory
//! reference engine so the rest of the workspace can be exercised without a
//! real storage-engine dependency. Real engines -- B-tree pages, buffer
//! pool, redo log -- are an explicit non-goal (spec.md §1).

pub mod cursor;
pub mod mock;
pub mod table;

pub use cursor::{Cursor, ExtraHint, ReadOutcome, TableFlags, UpdateOutcome, WriteOutcome};
pub use mock::MemoryCursor;
pub use table::Table;
