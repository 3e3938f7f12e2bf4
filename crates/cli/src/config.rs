use anyhow::{Context, Result};
use recommend_search::{TaskOverrides, TaskSettings};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_APP_NAME: &str = "recommend";

/// Config file as written on disk. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub app_name: Option<String>,
    pub workers: Option<usize>,
    pub user_recommend: TaskOverrides,
    pub project_recommend: TaskOverrides,
}

/// Fully resolved configuration handed to the task registry.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub app_name: String,
    pub workers: Option<usize>,
    pub user: TaskSettings,
    pub project: TaskSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            workers: None,
            user: TaskSettings::user_defaults(),
            project: TaskSettings::project_defaults(),
        }
    }
}

impl ConfigFile {
    /// Parse `raw` as TOML when `path` ends in `.toml`, JSON otherwise.
    pub fn parse(raw: &str, path: &Path) -> Result<Self> {
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            toml::from_str(raw).with_context(|| format!("Invalid TOML config {}", path.display()))
        } else {
            serde_json::from_str(raw)
                .with_context(|| format!("Invalid JSON config {}", path.display()))
        }
    }

    pub fn resolve(&self) -> Result<AppConfig> {
        let user = self
            .user_recommend
            .apply(TaskSettings::user_defaults())
            .context("Invalid user_recommend settings")?;
        let project = self
            .project_recommend
            .apply(TaskSettings::project_defaults())
            .context("Invalid project_recommend settings")?;
        Ok(AppConfig {
            app_name: self
                .app_name
                .clone()
                .unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            workers: self.workers,
            user,
            project,
        })
    }
}

/// Load and resolve the config at `path`, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = ConfigFile::parse(&raw, path)?.resolve()?;
    log::debug!("Loaded config {} ({})", path.display(), config.app_name);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.user.weights.window_days, 30);
        assert_eq!(config.project.weights.window_days, 7);
    }

    #[test]
    fn json_config_overrides_selected_keys() {
        let raw = r#"{
            "app_name": "doraemon",
            "workers": 4,
            "project_recommend": {"max_output_count": 5, "window_days": 14}
        }"#;
        let config = ConfigFile::parse(raw, Path::new("conf.json"))
            .unwrap()
            .resolve()
            .unwrap();
        assert_eq!(config.app_name, "doraemon");
        assert_eq!(config.workers, Some(4));
        assert_eq!(config.project.max_output_count, 5);
        assert_eq!(config.project.weights.window_days, 14);
        assert_eq!(config.project.weights.basic_weight, 0.3);
        assert_eq!(config.user, TaskSettings::user_defaults());
    }

    #[test]
    fn toml_is_picked_by_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recommend.TOML");
        std::fs::write(
            &path,
            "workers = 2\n\n[user_recommend]\nbasic_weight = 1.0\naction_weight = 0.0\n",
        )
        .unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.user.weights.basic_weight, 1.0);
        assert_eq!(config.user.weights.action_weight, 0.0);
        assert_eq!(config.app_name, DEFAULT_APP_NAME);
    }

    #[test]
    fn invalid_settings_are_fatal() {
        let raw = r#"{"user_recommend": {"window_days": -3}}"#;
        let err = ConfigFile::parse(raw, Path::new("c.json"))
            .unwrap()
            .resolve()
            .unwrap_err();
        assert!(format!("{err:#}").contains("window_days"));
    }

    #[test]
    fn unreadable_or_malformed_files_fail() {
        let dir = TempDir::new().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.json"))).is_err());

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_config(Some(&path)).is_err());

        let path = dir.path().join("typo.json");
        std::fs::write(&path, r#"{"wokers": 3}"#).unwrap();
        assert!(load_config(Some(&path)).is_err());
    }
}
