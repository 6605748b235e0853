use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";

/// Keywords that mark a task as a document/knowledge-base query.
pub const DEFAULT_FAST_KEYWORDS: &[&str] = &[
    "file",
    "document",
    "abstract",
    "hrms",
    "policy",
    "report",
    "find",
    "show me",
    "literature",
    "survey",
    "project",
    "system",
    "introduction",
    "explain",
    "what is",
];

const CONFIG_FILE_PATH: &str = "mission.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base address shared by every endpoint.
    pub base_url: String,
    pub stream_path: String,
    pub search_path: String,
    pub run_path: String,
    pub user_id: Option<String>,
    pub https_proxy: String,
    /// Fast-path trigger keywords, matched case-insensitively in order.
    pub fast_keywords: Vec<String>,
}

fn mission_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".mission")
}

fn mission_config_json_path() -> PathBuf {
    mission_dir().join("config.json")
}

fn parse_keyword_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            stream_path: "/agent/stream".to_string(),
            search_path: "/search".to_string(),
            run_path: "/agent/run".to_string(),
            user_id: None,
            https_proxy: String::new(),
            fast_keywords: DEFAULT_FAST_KEYWORDS
                .iter()
                .map(|keyword| keyword.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Load defaults, then the first config file found, then environment overrides.
    ///
    /// Unreadable or malformed files are skipped with a warning.
    pub fn new() -> Self {
        let mut config = Config::default();

        let json_path = mission_config_json_path();
        let mut loaded = false;
        if json_path.exists() {
            match Self::from_path(&json_path) {
                Ok(file_config) => {
                    config = file_config;
                    loaded = true;
                }
                Err(e) => log::warn!("Skipping {}: {}", json_path.display(), e),
            }
        }

        if !loaded && Path::new(CONFIG_FILE_PATH).exists() {
            match Self::from_path(CONFIG_FILE_PATH) {
                Ok(file_config) => config = file_config,
                Err(e) => log::warn!("Skipping {}: {}", CONFIG_FILE_PATH, e),
            }
        }

        config.apply_env();
        config
    }

    /// Load an explicit `.json` or `.toml` file. Anything not ending in `.json` is read as TOML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config = if is_json {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        if let Ok(base_url) = std::env::var("AGENT_API_URL") {
            self.base_url = base_url;
        }
        if let Ok(user_id) = std::env::var("MISSION_USER_ID") {
            self.user_id = Some(user_id);
        }
        if let Ok(keywords) = std::env::var("MISSION_KEYWORDS") {
            let keywords = parse_keyword_list(&keywords);
            if !keywords.is_empty() {
                self.fast_keywords = keywords;
            }
        }
        if let Ok(https_proxy) = std::env::var("HTTPS_PROXY") {
            self.https_proxy = https_proxy;
        }
    }

    /// Join the base address and an endpoint path with exactly one `/`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn stream_url(&self) -> String {
        self.endpoint(&self.stream_path)
    }

    pub fn search_url(&self) -> String {
        self.endpoint(&self.search_path)
    }

    pub fn run_url(&self) -> String {
        self.endpoint(&self.run_path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.base_url.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_with_single_slash() {
        let mut config = Config::default();
        config.base_url = "http://agent:8001/".to_string();
        assert_eq!(config.endpoint("/search"), "http://agent:8001/search");
        assert_eq!(config.endpoint("search"), "http://agent:8001/search");
        assert_eq!(config.stream_url(), "http://agent:8001/agent/stream");
        assert_eq!(config.run_url(), "http://agent:8001/agent/run");
    }

    #[test]
    fn default_keywords_have_no_duplicates() {
        let config = Config::default();
        let mut seen = std::collections::HashSet::new();
        for keyword in &config.fast_keywords {
            assert!(seen.insert(keyword), "duplicate keyword {keyword:?}");
        }
    }

    #[test]
    fn parse_keyword_list_trims_and_lowercases() {
        assert_eq!(
            parse_keyword_list(" Report , ,HRMS,show me "),
            vec!["report".to_string(), "hrms".to_string(), "show me".to_string()]
        );
        assert!(parse_keyword_list(" , ").is_empty());
    }

    #[test]
    fn from_path_reads_toml_with_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mission.toml");
        std::fs::write(&path, "base_url = \"https://agents.internal\"\nuser_id = \"u-7\"\n")
            .expect("write");

        let config = Config::from_path(&path).expect("config");
        assert_eq!(config.base_url, "https://agents.internal");
        assert_eq!(config.user_id.as_deref(), Some("u-7"));
        assert_eq!(config.search_path, "/search");
        assert_eq!(config.fast_keywords, Config::default().fast_keywords);
    }

    #[test]
    fn from_path_reads_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"fast_keywords": ["manual"]}"#).expect("write");

        let config = Config::from_path(&path).expect("config");
        assert_eq!(config.fast_keywords, vec!["manual".to_string()]);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn from_path_reports_invalid_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").expect("write");
        assert!(matches!(Config::from_path(&path), Err(ConfigError::Json(_))));

        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::from_path(&missing), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn validate_rejects_non_http_base() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());
        config.base_url = "localhost:8001".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));
    }
}
