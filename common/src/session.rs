//! Session/warning-sink interface (spec.md §4.8): what the core assumes of
//! its embedding session. `Session` is a minimal concrete implementation
//! sufficient to drive the row-write state machine and its tests; a real
//! embedding server is expected to supply its own `WarningSink`.

use crate::config::{CutedFieldsMode, SessionConfig, SessionOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningLevel {
    Note,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub level: WarningLevel,
    pub code: String,
    pub text: String,
}

/// What the row-write and Field layers need from the embedding session to
/// report diagnostics, independent of how the session stores them.
pub trait WarningSink {
    fn push_warning(&mut self, level: WarningLevel, code: &str, text: &str);
    fn cuted_fields(&self) -> u64;
    fn bump_cuted_fields(&mut self);
}

/// A self-contained `Session`, per spec.md §4.8 and §5 ("each session owns
/// its Session ... not shared; no locking required").
pub struct Session {
    pub config: SessionConfig,
    warnings: Vec<Warning>,
    cuted_fields: u64,
    first_successful_insert_id_in_cur_stmt: i64,
    last_insert_id_arg: i64,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Session {
            config,
            warnings: Vec::new(),
            cuted_fields: 0,
            first_successful_insert_id_in_cur_stmt: 0,
            last_insert_id_arg: 0,
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.config.options
    }

    pub fn cuted_fields_mode(&self) -> CutedFieldsMode {
        self.config.cuted_fields_mode
    }

    /// Decides whether a warning-level condition should abort, combining
    /// `cuted_fields_mode` with strict-mode escalation (spec.md §7).
    pub fn really_abort_on_warning(&self, level: WarningLevel) -> bool {
        if self.options().is_strict() && level != WarningLevel::Note {
            return true;
        }
        matches!(
            (self.cuted_fields_mode(), level),
            (CutedFieldsMode::ErrorForNull, WarningLevel::Warning | WarningLevel::Error)
        )
    }

    pub fn record_first_successful_insert_id_in_cur_stmt(&mut self, n: i64) {
        if self.first_successful_insert_id_in_cur_stmt == 0 {
            self.first_successful_insert_id_in_cur_stmt = n;
        }
    }

    pub fn arg_of_last_insert_id_function(&self) -> i64 {
        self.first_successful_insert_id_in_cur_stmt
    }

    pub fn set_last_insert_id_arg(&mut self, n: i64) {
        self.last_insert_id_arg = n;
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Resets per-statement counters; called at statement end.
    pub fn reset_statement_scope(&mut self) {
        self.first_successful_insert_id_in_cur_stmt = 0;
    }
}

impl WarningSink for Session {
    fn push_warning(&mut self, level: WarningLevel, code: &str, text: &str) {
        if self.config.cuted_fields_mode == CutedFieldsMode::Ignore && level != WarningLevel::Error {
            return;
        }
        self.warnings.push(Warning {
            level,
            code: code.to_string(),
            text: text.to_string(),
        });
    }

    fn cuted_fields(&self) -> u64 {
        self.cuted_fields
    }

    fn bump_cuted_fields(&mut self) {
        self.cuted_fields += 1;
    }
}
