use std::collections::BTreeMap;
use std::path::Path;

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::ir::ElementType;
use crate::type_table::TypeTable;

/// Configuration IO error.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Invalid format.
    #[error("Config error => Invalid format: {0}")]
    InvalidFormat(String),

    /// File not found.
    #[error("Config error => File not found: {0}")]
    FileNotFound(String),
}

/// Verbosity of the console logger.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    /// No output.
    Off,
    /// Errors only.
    Error,
    /// Warnings and errors.
    Warn,
    /// Progress messages.
    #[default]
    Info,
    /// Decoding decisions.
    Debug,
    /// Every visited node.
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Decoder configuration.
///
/// ```json
/// {
///   "types": { "torch.int64": "i64", "torch.float64": "f64" },
///   "log_level": "debug"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Native type names recognized on top of the standard table.
    #[serde(default)]
    pub types: BTreeMap<String, ElementType>,
    /// Console logger verbosity.
    #[serde(default)]
    pub log_level: LogLevel,
}

impl DecoderConfig {
    /// Configuration with the standard table only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recognize `name` as `elem_type`.
    pub fn with_type(mut self, name: impl Into<String>, elem_type: ElementType) -> Self {
        self.types.insert(name.into(), elem_type);
        self
    }

    /// Set the logger verbosity.
    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    /// The standard table extended with the configured names.
    ///
    /// Names already present in the standard table keep their standard mapping.
    pub fn type_table(&self) -> TypeTable {
        let mut table = TypeTable::standard().clone();
        table.extend(
            self.types
                .iter()
                .map(|(name, elem_type)| (name.as_str(), *elem_type)),
        );
        table
    }

    /// Saves the configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, file: P) -> std::io::Result<()> {
        std::fs::write(file, self.to_json())
    }

    /// Loads the configuration from a file.
    pub fn load<P: AsRef<Path>>(file: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(file.as_ref())
            .map_err(|_| ConfigError::FileNotFound(file.as_ref().to_string_lossy().to_string()))?;
        Self::from_json(&content)
    }

    /// Parses the configuration from JSON text.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|err| ConfigError::InvalidFormat(format!("{err}")))
    }

    /// Pretty JSON representation.
    pub fn to_json(&self) -> String {
        // Plain maps of strings and unit variants always serialize.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extends_standard_table() {
        let config = DecoderConfig::new()
            .with_type("torch.int64", ElementType::Int64)
            .with_type("int", ElementType::Int64);
        let table = config.type_table();

        assert_eq!(table.lookup("torch.int64"), ElementType::Int64);
        // Standard mappings are never replaced.
        assert_eq!(table.lookup("int"), ElementType::Int32);
        assert_eq!(table.lookup("torch.float32"), ElementType::Float32);
    }

    #[test]
    fn parses_json() {
        let config = DecoderConfig::from_json(
            r#"{"types": {"torch.float64": "f64"}, "log_level": "trace"}"#,
        )
        .unwrap();
        assert_eq!(config.types["torch.float64"], ElementType::Float64);
        assert_eq!(config.log_level, LogLevel::Trace);
        assert_eq!(LevelFilter::from(config.log_level), LevelFilter::Trace);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config = DecoderConfig::from_json("{}").unwrap();
        assert_eq!(config, DecoderConfig::default());
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn invalid_format() {
        let err = DecoderConfig::from_json(r#"{"types": {"x": "complex"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFormat(_)));
        assert!(err.to_string().starts_with("Config error => Invalid format"));
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join("script-graph-config-save-then-load.json");
        let config = DecoderConfig::new()
            .with_type("torch.uint8", ElementType::Uint8)
            .with_log_level(LogLevel::Warn);

        config.save(&path).unwrap();
        let loaded = DecoderConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn file_not_found() {
        let err = DecoderConfig::load("/nonexistent/script-graph.json").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
