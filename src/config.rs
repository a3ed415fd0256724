use chrono::format::{Item, StrftimeItems};
use color_eyre::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Identity of the person at the keyboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub uid: String,
    pub display_name: String,
    pub photo_url: String,
}

/// Chat database location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Empty means `<data dir>/palaver.db`
    pub path: String,
}

/// Screen layout and formatting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub scroll_step: u16,
    pub sidebar_width: u16,
    pub time_format: String,
}

/// Log filter and destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Empty means `<data dir>/palaver.log`
    pub file: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            uid: "me".to_string(),
            display_name: "Me".to_string(),
            photo_url: String::new(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            scroll_step: 3,
            sidebar_width: 34,
            time_format: "%I:%M %p".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: String::new(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, writing defaults there if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would only fail later, mid-render
    pub fn validate(&self) -> Result<()> {
        if StrftimeItems::new(&self.ui.time_format).any(|item| item == Item::Error) {
            return Err(color_eyre::eyre::eyre!(
                "Invalid ui.time_format {:?}: not a strftime pattern",
                self.ui.time_format
            ));
        }
        Ok(())
    }

    /// Saves configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Returns the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        if self.storage.path.is_empty() {
            return Ok(Self::project_dirs()?.data_dir().join("palaver.db"));
        }
        Ok(PathBuf::from(&self.storage.path))
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if self.logging.file.is_empty() {
            return Ok(Self::project_dirs()?.data_dir().join("palaver.log"));
        }
        Ok(PathBuf::from(&self.logging.file))
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "palaver")
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not determine config directory"))
    }
}
