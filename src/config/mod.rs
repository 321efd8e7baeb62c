use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend service configuration
    pub backend: BackendConfig,

    /// Settings storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Notification timings
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Frontend defaults
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL the `api/` and `static/` paths are resolved against
    pub base_url: String,

    /// Optional client-side timeout for backend requests
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the per-origin settings files
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Seconds before an error banner hides itself
    pub error_dismiss_secs: u64,

    /// Seconds before a toast hides itself
    pub toast_dismiss_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default output format for formatted transcripts
    pub output_format: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            error_dismiss_secs: 15,
            toast_dismiss_secs: 3,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_format: "text".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "http://localhost:8001/verbatim-ai/".to_string(),
                request_timeout_secs: None,
            },
            storage: StorageConfig::default(),
            notifications: NotificationConfig::default(),
            defaults: DefaultsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load and validate a configuration file at an explicit path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let config: AppConfig =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub async fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    fn save_to(&self, config_path: &std::path::Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("verbatim-client").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.backend.base_url)
            .with_context(|| format!("Invalid backend base URL: {}", self.backend.base_url))?;

        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("Backend base URL must use HTTP or HTTPS protocol");
        }

        if self.notifications.error_dismiss_secs == 0 || self.notifications.toast_dismiss_secs == 0 {
            anyhow::bail!("Notification dismiss durations must be at least one second");
        }

        if self.backend.request_timeout_secs == Some(0) {
            anyhow::bail!("Request timeout must be at least one second when set");
        }

        Ok(())
    }

    /// Directory holding the per-origin settings files
    pub fn storage_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.dir {
            return Ok(dir.clone());
        }

        let data_dir = dirs::data_dir().context("Could not determine data directory")?;
        Ok(data_dir.join("verbatim-client").join("storage"))
    }

    pub fn error_dismiss(&self) -> Duration {
        Duration::from_secs(self.notifications.error_dismiss_secs)
    }

    pub fn toast_dismiss(&self) -> Duration {
        Duration::from_secs(self.notifications.toast_dismiss_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.backend.request_timeout_secs.map(Duration::from_secs)
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Backend URL: {}", self.backend.base_url);
        match self.backend.request_timeout_secs {
            Some(secs) => println!("  Request Timeout: {}s", secs),
            None => println!("  Request Timeout: none"),
        }
        match self.storage_dir() {
            Ok(dir) => println!("  Storage Dir: {}", dir.display()),
            Err(e) => println!("  Storage Dir: unavailable ({})", e),
        }
        println!(
            "  Notifications: errors {}s, toasts {}s",
            self.notifications.error_dismiss_secs, self.notifications.toast_dismiss_secs
        );
        println!("  Default Format: {}", self.defaults.output_format);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.error_dismiss(), Duration::from_secs(15));
        assert_eq!(config.toast_dismiss(), Duration::from_secs(3));
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut config = AppConfig::default();
        config.backend.base_url = "ftp://example.com/".to_string();
        assert!(config.validate().is_err());

        config.backend.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_dismiss() {
        let mut config = AppConfig::default();
        config.notifications.toast_dismiss_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file_fills_optional_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs_err::write(&path, "backend:\n  base_url: https://example.com/verbatim-ai/\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.backend.base_url, "https://example.com/verbatim-ai/");
        assert_eq!(config.notifications.error_dismiss_secs, 15);
        assert_eq!(config.defaults.output_format, "text");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let mut config = AppConfig::default();
        config.storage.dir = Some(dir.path().join("storage"));
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.storage_dir().unwrap(), dir.path().join("storage"));
    }
}
