// Fri Oct 16 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const MIN_STACK_SIZE: usize = 16 * 1024;

/// Controls how task threads are spawned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub thread_name_prefix: String,
    pub stack_size: Option<usize>,
    pub log_panics: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thread_name_prefix: "promise-task".to_string(),
            stack_size: None,
            log_panics: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    pub fn with_log_panics(mut self, enabled: bool) -> Self {
        self.log_panics = enabled;
        self
    }

    pub fn thread_name(&self, id: u64, name: Option<&str>) -> String {
        let full = match name {
            Some(name) => format!("{}-{}", self.thread_name_prefix, name),
            None => format!("{}-{}", self.thread_name_prefix, id),
        };
        // thread::Builder refuses names with interior NUL
        full.replace('\0', "")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let ext = path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        if !ext.eq_ignore_ascii_case("json") {
            return Err(ConfigError::UnsupportedFormat(ext.to_string()));
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        let ext = path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or("json");

        if !ext.eq_ignore_ascii_case("json") {
            return Err(ConfigError::UnsupportedFormat(ext.to_string()));
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(path, contents)?;
        Ok(())
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Using default config: {}", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thread_name_prefix.is_empty() {
            return Err(ConfigError::Validation("thread_name_prefix must not be empty".to_string()));
        }
        if self.thread_name_prefix.contains('\0') {
            return Err(ConfigError::Validation("thread_name_prefix must not contain NUL".to_string()));
        }
        if let Some(size) = self.stack_size {
            if size < MIN_STACK_SIZE {
                return Err(ConfigError::Validation(format!(
                    "stack_size must be at least {} bytes",
                    MIN_STACK_SIZE
                )));
            }
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Serialize error: {0}")]
    Serialize(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("thread-promise-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.thread_name(3, None), "promise-task-3");
        assert_eq!(config.thread_name(3, Some("fetch")), "promise-task-fetch");
    }

    #[test]
    fn test_save_and_load_json() {
        let path = temp_path("config.json");
        let config = Config::new()
            .with_thread_name_prefix("worker")
            .with_stack_size(64 * 1024)
            .with_log_panics(false);

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"log_panics": false}"#).unwrap();

        assert_eq!(config.thread_name_prefix, "promise-task");
        assert!(!config.log_panics);
    }

    #[test]
    fn test_rejects_unsupported_extension() {
        let err = Config::default().save(temp_path("config.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "yaml"));
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = Config::load_or_default(temp_path("missing.json"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validate_rejects_tiny_stack() {
        let config = Config::new().with_stack_size(1024);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }
}
