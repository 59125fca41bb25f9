use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};
use url::Url;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3333";
pub const BACKEND_URL_ENV: &str = "AUDIO_GRABBER_BACKEND_URL";

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Text => f.write_str("text"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Replaces the configured backend URL, e.g. from the environment or the command line.
    pub fn override_backend_url(&mut self, base_url: Option<String>) {
        if let Some(base_url) = base_url.filter(|url| !url.trim().is_empty()) {
            self.backend.base_url = base_url;
        }
    }

    pub fn backend_url(&self) -> Result<Url> {
        let url = Url::parse(self.backend.base_url.trim())
            .with_context(|| format!("Invalid backend URL {:?}", self.backend.base_url))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow::anyhow!(
                "Backend URL must use http or https, got {:?}",
                self.backend.base_url
            ));
        }

        Ok(url)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.backend
            .request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn get_logging_format(&self) -> LogFormat {
        self.logging.format
    }
}

/// Explicit path first, then `CONFIG_FILE`, then the XDG and home config directories.
pub fn find_config_path(explicit: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(PathBuf::from(path));
    }

    if let Ok(path) = std::env::var("CONFIG_FILE") {
        return Some(PathBuf::from(path));
    }

    let candidates = [
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        dirs::home_dir().map(|home| home.join(".config")),
    ];

    candidates
        .into_iter()
        .flatten()
        .map(|dir| dir.join("audio-grabber").join("config.toml"))
        .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(
            config.backend_url().unwrap().as_str(),
            "http://localhost:3333/"
        );
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.get_logging_format(), LogFormat::Json);
    }

    #[test]
    fn test_from_file() {
        let file = write_config(
            r#"
[backend]
base_url = "https://grabber.example.com/api"
request_timeout_secs = 90

[logging]
format = "text"
"#,
        );

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(
            config.backend_url().unwrap().as_str(),
            "https://grabber.example.com/api"
        );
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(90)));
        assert_eq!(config.get_logging_format(), LogFormat::Text);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config("[logging]\nformat = \"text\"\n");

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.backend.base_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.get_logging_format(), LogFormat::Text);
    }

    #[test]
    fn test_invalid_file() {
        let file = write_config("[logging]\nformat = \"xml\"\n");
        assert!(Config::from_file(file.path()).is_err());

        assert!(Config::from_file(Path::new("/definitely/not/here.toml")).is_err());
    }

    #[test]
    fn test_backend_url_override() {
        let mut config = Config::default();

        config.override_backend_url(None);
        config.override_backend_url(Some("  ".to_string()));
        assert_eq!(config.backend.base_url, DEFAULT_BACKEND_URL);

        config.override_backend_url(Some("http://10.0.0.5:8080".to_string()));
        assert_eq!(
            config.backend_url().unwrap().as_str(),
            "http://10.0.0.5:8080/"
        );
    }

    #[test]
    fn test_rejects_bad_backend_url() {
        let mut config = Config::default();

        config.override_backend_url(Some("localhost".to_string()));
        assert!(config.backend_url().is_err());

        config.override_backend_url(Some("ftp://example.com".to_string()));
        assert!(config.backend_url().is_err());
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let mut config = Config::default();
        config.backend.request_timeout_secs = Some(0);
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_find_config_path_explicit() {
        assert_eq!(
            find_config_path(Some("/etc/audio-grabber.toml")),
            Some(PathBuf::from("/etc/audio-grabber.toml"))
        );
    }
}
