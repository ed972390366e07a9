//! `CopyInfo` (spec.md §4.5): the per-call duplicate policy and the output
//! counters the row-write state machine mutates as it processes a
//! statement's rows.

use field::FieldValue;

/// Which of the four duplicate-key behaviors a statement requested
/// (GLOSSARY: "Duplicate policy").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    Error,
    Replace,
    Update,
    Ignore,
}

impl Default for DuplicatePolicy {
    fn default() -> Self {
        DuplicatePolicy::Error
    }
}

/// One `ON DUPLICATE KEY UPDATE col = expr` assignment, already evaluated
/// to a value -- expression evaluation itself is an explicit non-goal
/// (spec.md §1), so the caller supplies the right-hand side directly.
#[derive(Debug, Clone)]
pub struct UpdateAssignment {
    pub field_index: usize,
    pub value: FieldValue,
}

/// Mutated by the row-write state machine as it processes one statement's
/// rows (spec.md §4.5 "Output counters").
#[derive(Debug, Default)]
pub struct CopyInfo {
    pub policy: DuplicatePolicy,
    pub update_assignments: Vec<UpdateAssignment>,

    pub records: u64,
    pub copied: u64,
    pub updated: u64,
    pub deleted: u64,
    pub touched: u64,
    pub last_errno: i32,
}

impl CopyInfo {
    pub fn new(policy: DuplicatePolicy) -> Self {
        CopyInfo {
            policy,
            ..Default::default()
        }
    }

    pub fn with_update_assignments(mut self, assignments: Vec<UpdateAssignment>) -> Self {
        self.update_assignments = assignments;
        self
    }

    /// `records - copied`: the duplicates count under IGNORE (spec.md §8
    /// testable property 7).
    pub fn duplicates(&self) -> u64 {
        self.records.saturating_sub(self.copied)
    }

    /// Session-visible `rows_affected` (spec.md §7): `FOUND_ROWS` selects
    /// between counting UPDATE's matched-but-unchanged rows or not.
    pub fn rows_affected(&self, found_rows: bool) -> u64 {
        if found_rows {
            self.copied + self.deleted + self.updated
        } else {
            self.copied + self.deleted + self.touched
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn duplicates_is_records_minus_copied() {
        let mut info = CopyInfo::new(DuplicatePolicy::Ignore);
        info.records = 5;
        info.copied = 3;
        assert_eq!(info.duplicates(), 2);
    }

    #[test]
    fn rows_affected_switches_on_found_rows() {
        let mut info = CopyInfo::new(DuplicatePolicy::Update);
        info.copied = 1;
        info.updated = 2;
        info.touched = 4;
        info.deleted = 0;
        assert_eq!(info.rows_affected(true), 3);
        assert_eq!(info.rows_affected(false), 5);
    }
}
