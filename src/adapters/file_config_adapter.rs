//! INI file configuration adapter.

use crate::domain::error::ConfluenceError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfluenceError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| ConfluenceError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_sections() {
        let content = r#"
[strategies]
ma_short_window = 10
ma_long_window = 30

[fusion]
confidence_threshold = 65.5

[risk]
allow_shorting = yes
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(adapter.get_int("strategies", "ma_short_window", 0), 10);
        assert_eq!(adapter.get_int("strategies", "ma_long_window", 0), 30);
        assert_eq!(adapter.get_double("fusion", "confidence_threshold", 0.0), 65.5);
        assert!(adapter.get_bool("risk", "allow_shorting", false));
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[risk]\nleverage_ceiling = 1.0\n").unwrap();
        assert_eq!(adapter.get_string("risk", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[strategies]\n").unwrap();
        assert_eq!(adapter.get_int("strategies", "rsi_period", 14), 14);
    }

    #[test]
    fn get_int_returns_default_for_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[strategies]\nrsi_period = abc\n").unwrap();
        assert_eq!(adapter.get_int("strategies", "rsi_period", 14), 14);
        assert_eq!(
            adapter.get_string("strategies", "rsi_period"),
            Some("abc".to_string())
        );
    }

    #[test]
    fn get_double_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[portfolio]\ninitial_capital = not_a_number\n")
                .unwrap();
        assert_eq!(adapter.get_double("portfolio", "initial_capital", 99.9), 99.9);
    }

    #[test]
    fn get_bool_values() {
        let adapter = FileConfigAdapter::from_string(
            "[risk]\na = true\nb = no\nc = 1\nd = FALSE\ne = maybe\n",
        )
        .unwrap();
        assert!(adapter.get_bool("risk", "a", false));
        assert!(!adapter.get_bool("risk", "b", true));
        assert!(adapter.get_bool("risk", "c", false));
        assert!(!adapter.get_bool("risk", "d", true));
        assert!(adapter.get_bool("risk", "e", true));
        assert!(!adapter.get_bool("risk", "missing", false));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[portfolio]\ninitial_capital = 25000\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_double("portfolio", "initial_capital", 0.0),
            25000.0
        );
    }

    #[test]
    fn from_file_missing_is_parse_error() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(result, Err(ConfluenceError::ConfigParse { .. })));
    }
}
