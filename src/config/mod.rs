pub mod init;
mod schema;

pub use schema::Config;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::scoring::{validate_rubric, RubricConfig};

/// Get the config directory path (~/.config/mun-marker/)
pub fn get_config_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".config").join("mun-marker")
}

/// Get the default config file path (~/.config/mun-marker/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/mun-marker/config.yaml)
///
/// A missing default file yields the default configuration. A path given
/// explicitly must exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicit config path does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    Ok(config)
}

/// Write configuration as YAML, creating parent directories.
pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    fs::write(path, yaml).with_context(|| format!("Failed to write config to {}", path.display()))
}

impl Config {
    pub fn ledger_path(&self) -> PathBuf {
        self.ledger_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(crate::ledger::get_ledger_path)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Read a rubric from a YAML file and validate it.
pub fn load_rubric_file(path: &Path) -> Result<RubricConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read rubric file at {}", path.display()))?;

    let rubric: RubricConfig = serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse rubric: invalid YAML in {}", path.display()))?;

    if let Err(errors) = validate_rubric(&rubric) {
        anyhow::bail!("Rubric errors in {}:\n  - {}", path.display(), errors.join("\n  - "));
    }

    Ok(rubric)
}

/// Render a rubric as YAML.
pub fn rubric_to_yaml(rubric: &RubricConfig) -> Result<String> {
    serde_saphyr::to_string(rubric).map_err(|e| anyhow::anyhow!("Failed to serialize rubric: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(dir.path().join("absent.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("config.yaml");
        let config = Config {
            ledger_path: Some("/tmp/ledger.json".to_string()),
            export_dir: None,
            log_level: Some("info".to_string()),
        };

        save_config(&path, &config).unwrap();
        let loaded = load_config(Some(path)).unwrap();

        assert_eq!(loaded, config);
        assert_eq!(loaded.ledger_path(), PathBuf::from("/tmp/ledger.json"));
        assert_eq!(loaded.export_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_empty_config_parses() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_config_field_rejected() {
        let result = serde_saphyr::from_str::<Config>("queries: []");
        assert!(result.is_err());
    }

    #[test]
    fn test_rubric_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rubric.yaml");
        let rubric = RubricConfig::default();

        fs::write(&path, rubric_to_yaml(&rubric).unwrap()).unwrap();
        assert_eq!(load_rubric_file(&path).unwrap(), rubric);
    }

    #[test]
    fn test_invalid_rubric_file_lists_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rubric.yaml");
        fs::write(
            &path,
            r#"
participation_items:
  - { key: poi, label: POI }
  - { key: poi, label: POI again, weight: -1 }
"#,
        )
        .unwrap();

        let err = load_rubric_file(&path).unwrap_err().to_string();
        assert!(err.contains("duplicate key 'poi'"));
        assert!(err.contains("participation_items[1].weight"));
    }
}
