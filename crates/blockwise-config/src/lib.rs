use blockwise_engine::EditorOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Document opened when none is named on the command line.
pub const DEFAULT_START_DOCUMENT: &str = "index.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config at {config_path}: {reason}")]
    Invalid { config_path: PathBuf, reason: String },
}

/// Contents of `~/.config/blockwise/config.toml`.
///
/// ```toml
/// documents_path = "~/blocks"
/// start_document = "journal/today.json"
///
/// [editor]
/// default_block_type = "paragraph"
/// last_block_policy = "clear"
/// unknown_type_policy = "placeholder"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub documents_path: PathBuf,
    /// Relative to `documents_path`.
    #[serde(default = "default_start_document")]
    pub start_document: String,
    #[serde(default)]
    pub editor: EditorOptions,
}

fn default_start_document() -> String {
    DEFAULT_START_DOCUMENT.to_string()
}

impl Config {
    pub fn new(documents_path: impl Into<PathBuf>) -> Self {
        Self {
            documents_path: documents_path.into(),
            start_document: default_start_document(),
            editor: EditorOptions::default(),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config.documents_path =
            Self::expand_path(&config.documents_path).unwrap_or(config.documents_path);
        config.validate().map_err(|reason| ConfigError::Invalid {
            config_path: config_path.to_path_buf(),
            reason,
        })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/blockwise");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Absolute path of the document opened at startup.
    pub fn start_document_path(&self) -> PathBuf {
        self.documents_path.join(&self.start_document)
    }

    fn validate(&self) -> Result<(), String> {
        if self.start_document.trim().is_empty() {
            return Err("start_document must not be empty".into());
        }
        if Path::new(&self.start_document).is_absolute() {
            return Err(format!(
                "start_document must be relative to documents_path, got {}",
                self.start_document
            ));
        }
        if let Some(block_type) = &self.editor.default_block_type
            && block_type.trim().is_empty()
        {
            return Err("editor.default_block_type must not be empty".into());
        }
        Ok(())
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockwise_engine::{LastBlockPolicy, UnknownTypePolicy};
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/blockwise/config.toml"));
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "documents_path = \"/tmp/blocks\"\n");

        let config = Config::load_from_path(&path).unwrap().unwrap();

        assert_eq!(config, Config::new("/tmp/blocks"));
        assert_eq!(
            config.start_document_path(),
            PathBuf::from("/tmp/blocks/index.json")
        );
    }

    #[test]
    fn test_editor_table_is_parsed() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"
documents_path = "/tmp/blocks"
start_document = "notes/today.json"

[editor]
default_block_type = "header"
last_block_policy = "reject"
unknown_type_policy = "drop"
"#,
        );

        let config = Config::load_from_path(&path).unwrap().unwrap();

        assert_eq!(config.start_document, "notes/today.json");
        assert_eq!(config.editor.default_block_type.as_deref(), Some("header"));
        assert_eq!(config.editor.last_block_policy, LastBlockPolicy::Reject);
        assert_eq!(config.editor.unknown_type_policy, UnknownTypePolicy::Drop);
    }

    #[test]
    fn test_unknown_policy_value_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            "documents_path = \"/tmp\"\n[editor]\nlast_block_policy = \"explode\"\n",
        );

        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
    }

    #[test]
    fn test_absolute_start_document_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            "documents_path = \"/tmp\"\nstart_document = \"/etc/passwd\"\n",
        );

        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/path");
        let expanded = Config::expand_path(&path).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("BLOCKWISE_TEST_VAR", "/test/env/path");
        }

        let path = PathBuf::from("$BLOCKWISE_TEST_VAR/subdir");
        let expanded = Config::expand_path(&path).unwrap();
        assert_eq!(expanded, PathBuf::from("/test/env/path/subdir"));

        unsafe {
            env::remove_var("BLOCKWISE_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_path_leaves_plain_paths_alone() {
        for raw in ["/absolute/path", "relative/path"] {
            let path = PathBuf::from(raw);
            assert_eq!(Config::expand_path(&path).unwrap(), path);
        }
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let mut config = Config::new("/tmp/test-blocks");
        config.editor.default_block_type = Some("quote".into());
        config.editor.unknown_type_policy = UnknownTypePolicy::Reject;

        config.save_to_path(&config_file).unwrap();
        let loaded = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_documents_path_with_env_var_in_toml() {
        unsafe {
            env::set_var("BLOCKWISE_ROOT", "/custom/blocks");
        }
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "documents_path = \"$BLOCKWISE_ROOT/mine\"\n");

        let config = Config::load_from_path(&path).unwrap().unwrap();
        assert_eq!(config.documents_path, PathBuf::from("/custom/blocks/mine"));

        unsafe {
            env::remove_var("BLOCKWISE_ROOT");
        }
    }
}
