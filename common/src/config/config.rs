use serde::{Deserialize, Serialize};

/// Session-visible mode bits that change how `Field::store` and the
/// row-write state machine treat coercion failures (spec.md §4.8, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    pub found_rows: bool,
    pub no_auto_value_on_zero: bool,
    pub strict_trans_tables: bool,
    pub strict_all_tables: bool,
    pub no_zero_date: bool,
    pub invalid_dates: bool,
    pub fuzzy_date: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            found_rows: false,
            no_auto_value_on_zero: false,
            strict_trans_tables: false,
            strict_all_tables: false,
            no_zero_date: false,
            invalid_dates: false,
            fuzzy_date: false,
        }
    }
}

impl SessionOptions {
    /// Whether the session is in "strict mode": TRUNCATED / OUT_OF_RANGE /
    /// BAD_VALUE escalate from warnings to hard errors.
    pub fn is_strict(&self) -> bool {
        self.strict_trans_tables || self.strict_all_tables
    }
}

/// How `count_cuted_fields` reacts to a truncation-class warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutedFieldsMode {
    Ignore,
    Warn,
    ErrorForNull,
}

impl Default for CutedFieldsMode {
    fn default() -> Self {
        CutedFieldsMode::Warn
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    pub options: SessionOptions,
    pub cuted_fields_mode: CutedFieldsMode,

    /// directory `TracingFactory` rolls daily log files into.
    pub log_dir: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strict_mode_is_driven_by_either_strict_bit() {
        let mut opts = SessionOptions::default();
        assert!(!opts.is_strict());
        opts.strict_trans_tables = true;
        assert!(opts.is_strict());
    }
}
