//! Configuration file discovery and loading

use std::fs;
use std::path::{Path, PathBuf};

use super::GlintConfiguration;
use crate::error::GlintError;
use crate::result::Result;

/// Config file names in priority order
pub const CONFIG_FILE_NAMES: &[&str] = &[".glintrc.toml", ".glintrc.json"];

/// A configuration together with the file it came from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedConfig {
    pub config: GlintConfiguration,
    /// `None` when no file was found and defaults apply
    pub source: Option<PathBuf>,
}

impl LoadedConfig {
    /// Directory that file globs are relative to
    pub fn base_dir(&self) -> Option<&Path> {
        self.source.as_deref().and_then(Path::parent)
    }
}

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover config file by traversing upward from start_path
    ///
    /// In each directory `.glintrc.toml` wins over `.glintrc.json`.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| GlintError::ConfigError {
                message: format!("Invalid path '{}': {e}", start_path.display()),
            })?;
        if current.is_file()
            && let Some(parent) = current.parent()
        {
            current = parent.to_path_buf();
        }

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific file
    ///
    /// `.toml` files are read as TOML; anything else as JSON with comments
    /// and trailing commas allowed.
    pub fn load_from_file(path: &Path) -> Result<GlintConfiguration> {
        let content = fs::read_to_string(path).map_err(|e| GlintError::ConfigError {
            message: format!("Failed to read config '{}': {e}", path.display()),
        })?;

        let parsed = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| e.to_string()),
            _ => json5::from_str(&content).map_err(|e| e.to_string()),
        };

        parsed.map_err(|e| GlintError::ConfigError {
            message: format!("Failed to load config from '{}': {e}", path.display()),
        })
    }

    /// Load config from an explicit path or auto-discover one
    ///
    /// Without an explicit path and without a discovered file, the default
    /// configuration is returned.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<LoadedConfig> {
        let config_path = match custom_path {
            Some(path) => {
                if !path.exists() {
                    return Err(GlintError::ConfigError {
                        message: format!("Config file not found: {}", path.display()),
                    });
                }
                Some(path.to_path_buf())
            }
            None => Self::auto_discover(start_dir.unwrap_or_else(|| Path::new(".")))?,
        };

        match config_path {
            Some(path) => {
                let config = Self::load_from_file(&path)?;
                tracing::debug!("Loaded config from {}", path.display());
                Ok(LoadedConfig {
                    config,
                    source: Some(path),
                })
            }
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(LoadedConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleSeverity;
    use tempfile::TempDir;

    fn create_temp_config(dir: &Path, filename: &str, content: &str) -> PathBuf {
        let path = dir.join(filename);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(
            temp_dir.path(),
            ".glintrc.toml",
            r#"
root = true

[files]
include = ["src/**/*.cs"]

[linter.rules]
recommended = false

[linter.rules.usage]
redundant-to-array = "error"
"#,
        );

        let config = ConfigLoader::load_from_file(&config_path).unwrap();
        assert_eq!(config.root, Some(true));
        let rules = config.linter_config().rules.unwrap();
        assert_eq!(rules.recommended, Some(false));
        assert_eq!(
            rules.usage.unwrap().get("redundant-to-array"),
            Some(&RuleSeverity::Error)
        );
        assert_eq!(
            config.files_config().include,
            Some(vec!["src/**/*.cs".to_string()])
        );
    }

    #[test]
    fn test_load_json_with_comments() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(
            temp_dir.path(),
            ".glintrc.json",
            r#"{
                // style tweaks
                "linter": {
                    "enabled": true,
                    "rules": { "style": { "GL2003": "warn", }, },
                },
            }"#,
        );

        let config = ConfigLoader::load_from_file(&config_path).unwrap();
        let linter = config.linter.unwrap();
        assert_eq!(linter.enabled, Some(true));
        assert_eq!(
            linter.rules.unwrap().style.unwrap().get("GL2003"),
            Some(&RuleSeverity::Warn)
        );
    }

    #[test]
    fn test_auto_discover_prefers_toml() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("src/nested");
        fs::create_dir_all(&nested).unwrap();
        create_temp_config(temp_dir.path(), ".glintrc.json", "{}");
        create_temp_config(temp_dir.path(), ".glintrc.toml", "");

        let found = ConfigLoader::auto_discover(&nested).unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), ".glintrc.toml");
    }

    #[test]
    fn test_nearest_config_wins() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("app");
        fs::create_dir_all(&nested).unwrap();
        create_temp_config(temp_dir.path(), ".glintrc.toml", "");
        let inner = create_temp_config(&nested, ".glintrc.json", "{}");

        let loaded = ConfigLoader::load(None, Some(&nested)).unwrap();
        assert_eq!(loaded.source, Some(inner.canonicalize().unwrap()));
        assert_eq!(loaded.base_dir(), Some(nested.canonicalize().unwrap().as_path()));
    }

    #[test]
    fn test_invalid_config_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(
            temp_dir.path(),
            ".glintrc.toml",
            "[linter.rules.usage]\nredundant-to-array = \"loud\"\n",
        );

        let err = ConfigLoader::load_from_file(&config_path).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }

    #[test]
    fn test_missing_explicit_config() {
        let result = ConfigLoader::load(Some(Path::new("nonexistent.toml")), None);
        assert!(result.is_err());
    }
}
