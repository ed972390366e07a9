pub mod config;

use std::fs::File;
use std::io::Read;
use std::path::Path;

pub use config::{CutedFieldsMode, SessionConfig, SessionOptions};

use crate::err::decode_error::ReError;

/// Reads a `SessionConfig` from a TOML file on disk, following the
/// teacher's single-file-read-then-deserialize convention.
pub fn read_config<P: AsRef<Path>>(path: P) -> Result<SessionConfig, ReError> {
    let mut file = File::open(path.as_ref())?;
    let mut s = String::new();
    file.read_to_string(&mut s)?;

    toml::from_str(s.as_str()).map_err(|e| ReError::ConfigFileParseErr(e.to_string()))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_session_config_from_toml() {
        let mut path = std::env::temp_dir();
        path.push("sqlcore_session_config_test.toml");
        {
            let mut f = File::create(&path).unwrap();
            writeln!(f, "[options]").unwrap();
            writeln!(f, "found_rows = false").unwrap();
            writeln!(f, "no_auto_value_on_zero = false").unwrap();
            writeln!(f, "strict_trans_tables = true").unwrap();
            writeln!(f, "strict_all_tables = false").unwrap();
            writeln!(f, "no_zero_date = false").unwrap();
            writeln!(f, "invalid_dates = false").unwrap();
            writeln!(f, "fuzzy_date = false").unwrap();
            writeln!(f, "cuted_fields_mode = \"Warn\"").unwrap();
        }

        let cfg = read_config(&path).unwrap();
        assert!(cfg.options.is_strict());
    }
}
