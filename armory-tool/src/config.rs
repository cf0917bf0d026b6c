use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use armory_client::{DEFAULT_API_PREFIX, DEFAULT_BASE_URL};
use armory_core::{DeletePolicy, Resource};
use serde::Deserialize;

use crate::error::ArmoryError;

pub const BASE_URL_ENV: &str = "ARMORY_BASE_URL";

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct Config {
    pub base_url: Option<String>,
    pub api_prefix: Option<String>,
    #[serde(default)]
    pub delete: DeleteConfig,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct DeleteConfig {
    /// Resources whose deletes ask for confirmation. Unset keeps the
    /// per-resource defaults.
    pub confirm: Option<Vec<Resource>>,
}

/// Effective settings after CLI, environment and file are combined.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub api_prefix: String,
    confirm: Option<Vec<Resource>>,
}

impl Settings {
    /// CLI flag wins over the environment, which wins over the file.
    pub fn resolve(cli_base_url: Option<String>, env_base_url: Option<String>, config: Config) -> Self {
        let base_url = cli_base_url
            .or(env_base_url.filter(|url| !url.is_empty()))
            .or(config.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_prefix = config
            .api_prefix
            .unwrap_or_else(|| DEFAULT_API_PREFIX.to_string());

        Self {
            base_url,
            api_prefix,
            confirm: config.delete.confirm,
        }
    }

    pub fn delete_policy(&self, resource: Resource) -> DeletePolicy {
        match &self.confirm {
            Some(confirm) if confirm.contains(&resource) => DeletePolicy::Confirm,
            Some(_) => DeletePolicy::Immediate,
            None => resource.default_delete_policy(),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("armory").join("config.toml"))
}

pub fn load_config() -> Result<Config, ArmoryError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(Config::default()),
    }
}

/// A missing file is the empty config; anything unreadable is an error.
pub fn load_config_from(path: &Path) -> Result<Config, ArmoryError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => return Err(e.into()),
    };

    toml::from_str(&content).map_err(|source| ArmoryError::Config {
        path: path.to_path_buf(),
        source,
    })
}

pub fn resolve_settings(cli_base_url: Option<String>) -> Result<Settings, ArmoryError> {
    let config = load_config()?;
    let env_base_url = std::env::var(BASE_URL_ENV).ok();
    Ok(Settings::resolve(cli_base_url, env_base_url, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let config: Config = toml::from_str(
            r#"
            base_url = "http://194.87.102.3"
            api_prefix = "admin/api/v2"

            [delete]
            confirm = ["items", "weapons"]
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://194.87.102.3"));
        assert_eq!(
            config.delete.confirm,
            Some(vec![Resource::Items, Resource::Weapons])
        );
    }

    #[test]
    fn empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn unknown_resource_is_an_error() {
        let result: Result<Config, _> = toml::from_str("[delete]\nconfirm = [\"skins\"]");
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("armory-no-such-config.toml");
        let config = load_config_from(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn malformed_file_is_reported() {
        let path = std::env::temp_dir().join("armory-malformed-config.toml");
        std::fs::write(&path, "base_url = ").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ArmoryError::Config { .. }));
    }

    #[test]
    fn precedence_cli_env_file_default() {
        let file = || Config {
            base_url: Some("http://file".to_string()),
            ..Config::default()
        };

        let s = Settings::resolve(Some("http://cli".into()), Some("http://env".into()), file());
        assert_eq!(s.base_url, "http://cli");
        let s = Settings::resolve(None, Some("http://env".into()), file());
        assert_eq!(s.base_url, "http://env");
        let s = Settings::resolve(None, Some(String::new()), file());
        assert_eq!(s.base_url, "http://file");
        let s = Settings::resolve(None, None, Config::default());
        assert_eq!(s.base_url, DEFAULT_BASE_URL);
        assert_eq!(s.api_prefix, DEFAULT_API_PREFIX);
    }

    #[test]
    fn delete_policy_defaults_and_overrides() {
        let defaults = Settings::resolve(None, None, Config::default());
        assert_eq!(
            defaults.delete_policy(Resource::Weapons),
            Resource::Weapons.default_delete_policy()
        );

        let config = Config {
            delete: DeleteConfig {
                confirm: Some(vec![Resource::Types]),
            },
            ..Config::default()
        };
        let settings = Settings::resolve(None, None, config);
        assert_eq!(settings.delete_policy(Resource::Types), DeletePolicy::Confirm);
        assert_eq!(settings.delete_policy(Resource::Items), DeletePolicy::Immediate);
    }
}
