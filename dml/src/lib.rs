//! The single-statement DML execution pipeline (spec.md §1): the row-write
//! state machine, the CREATE-TABLE-AS-SELECT bridge, and the bounded-memory
//! external sort/merge their secondary-index bulk build path uses.

pub mod copy_info;
pub mod ctas;
pub mod error;
pub mod sort_merge;
pub mod write_row;

pub use copy_info::{CopyInfo, DuplicatePolicy, UpdateAssignment};
pub use ctas::{execute_ctas, ProjectedColumn, StorageFactory};
pub use error::WriteError;
pub use sort_merge::{external_sort, SortError, MIN_MEMORY_BUDGET};
pub use write_row::{bulk_insert_rows, Cancellation, NeverCancelled, PreparedRow};
