use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_COMFORT_SCHEMA_ID: &str = "cl2_comfort";
pub const DEFAULT_QUEST_SCHEMA_ID: &str = "cl2_quest";

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
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// JSON file holding schemas and motes.
    pub store_path: PathBuf,
    #[serde(default = "default_comfort_schema_id")]
    pub comfort_schema_id: String,
    #[serde(default = "default_quest_schema_id")]
    pub quest_schema_id: String,
    /// Labels accepted by `Label: value` lines.
    #[serde(default = "default_global_labels")]
    pub global_labels: Vec<String>,
    #[serde(default = "default_true")]
    pub check_spelling: bool,
}

fn default_comfort_schema_id() -> String {
    DEFAULT_COMFORT_SCHEMA_ID.to_string()
}

fn default_quest_schema_id() -> String {
    DEFAULT_QUEST_SCHEMA_ID.to_string()
}

fn default_global_labels() -> Vec<String> {
    ["Name", "Description", "Unlocked Description", "Stage"]
        .map(String::from)
        .to_vec()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// A config with defaults for everything but the store location.
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            comfort_schema_id: default_comfort_schema_id(),
            quest_schema_id: default_quest_schema_id(),
            global_labels: default_global_labels(),
            check_spelling: true,
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

        // Expand shell variables and tilde in the store path
        config.store_path = Self::expand_path(&config.store_path).unwrap_or(config.store_path);

        Ok(Some(config))
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

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/moteworks");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn expand_path(path: &Path) -> Option<PathBuf> {
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
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/moteworks/config.toml"));
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config: Config = toml::from_str(r#"store_path = "/tmp/store.json""#).unwrap();

        assert_eq!(config, Config::new("/tmp/store.json"));
        assert_eq!(config.comfort_schema_id, "cl2_comfort");
        assert_eq!(config.quest_schema_id, "cl2_quest");
        assert!(config.check_spelling);
        assert_eq!(config.global_labels.len(), 4);
    }

    #[test]
    fn test_overrides_are_read() {
        let config_content = r#"
store_path = "/tmp/store.json"
quest_schema_id = "my_quest"
global_labels = ["Name", "Stage"]
check_spelling = false
"#;
        let config: Config = toml::from_str(config_content).unwrap();

        assert_eq!(config.quest_schema_id, "my_quest");
        assert_eq!(config.comfort_schema_id, "cl2_comfort");
        assert_eq!(config.global_labels, vec!["Name", "Stage"]);
        assert!(!config.check_spelling);
    }

    #[test]
    fn test_missing_store_path_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "check_spelling = true\n").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/store.json");
        let expanded = Config::expand_path(&path);

        assert!(expanded.is_some());
        let expanded = expanded.unwrap();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/store.json"));
    }

    #[test]
    fn test_expand_path_with_absolute_path() {
        let path = PathBuf::from("/absolute/store.json");
        let expanded = Config::expand_path(&path).unwrap();

        assert_eq!(expanded, path);
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
        let config_file = temp_dir.path().join("nested/config.toml");
        let test_config = Config {
            check_spelling: false,
            ..Config::new("/tmp/store.json")
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_store_path_with_env_var_in_toml() {
        unsafe {
            env::set_var("MOTEWORKS_TEST_ROOT", "/custom/project");
        }

        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            "store_path = \"$MOTEWORKS_TEST_ROOT/store.json\"\n",
        )
        .unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();
        assert_eq!(config.store_path, PathBuf::from("/custom/project/store.json"));

        unsafe {
            env::remove_var("MOTEWORKS_TEST_ROOT");
        }
    }
}
