// ⚙️ Application Configuration
//
// Everything the binaries need that used to be implicit: database and
// media locations, bind address, and the default display language. The
// default language lives here and is threaded into each request's
// LanguageResolver - never a module-level global.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::language::Language;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Directory holding downloadable media files
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,

    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Display language when neither query param nor header decides
    #[serde(default)]
    pub default_language: Language,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("content.db")
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("media")
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: default_database_path(),
            media_dir: default_media_dir(),
            bind_addr: default_bind_addr(),
            default_language: Language::Ru,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file, or defaults when no path is
    /// given. A present-but-unreadable file is an error, not a silent
    /// fallback.
    pub fn load(path: Option<&Path>) -> Result<AppConfig> {
        match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {:?}", path))?;
                let config: AppConfig = serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse config file {:?}", path))?;
                Ok(config)
            }
            None => Ok(AppConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.default_language, Language::Ru);
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.database_path, PathBuf::from("content.db"));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "default_language": "ky" }"#).unwrap();
        assert_eq!(config.default_language, Language::Ky);
        assert_eq!(config.database_path, PathBuf::from("content.db"));
    }

    #[test]
    fn test_load_without_path_is_defaults() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.default_language, Language::Ru);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(AppConfig::load(Some(Path::new("/no/such/config.json"))).is_err());
    }
}
