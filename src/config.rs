use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub locations: LocationsConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// false: serve the built-in sample posts, true: query the document store
    #[serde(default)]
    pub use_real_data: bool,
    /// Run the ping/insert/find/delete check against the store at startup
    #[serde(default)]
    pub test_connection: bool,
    /// Name of the environment variable holding the store connection string
    #[serde(default = "default_database_uri_env")]
    pub database_uri_env: String,
    #[serde(default = "default_collection")]
    pub collection: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocationsConfig {
    #[serde(default = "default_locations_path")]
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpeechConfig {
    #[serde(default = "default_speech_base_url")]
    pub base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub slow: bool,
}

fn default_bind_address() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_database_uri_env() -> String {
    "POSTS_DATABASE_URI".to_string()
}

fn default_collection() -> String {
    "posts".to_string()
}

fn default_locations_path() -> PathBuf {
    PathBuf::from("static/json/locations.json")
}

fn default_speech_base_url() -> String {
    "https://translate.google.com".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            use_real_data: false,
            test_connection: false,
            database_uri_env: default_database_uri_env(),
            collection: default_collection(),
        }
    }
}

impl Default for LocationsConfig {
    fn default() -> Self {
        Self {
            path: default_locations_path(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: default_speech_base_url(),
            language: default_language(),
            slow: false,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;

        if config.speech.language.trim().is_empty() {
            anyhow::bail!("[speech] language must not be empty");
        }

        Ok(config)
    }

    /// Document store connection string, read from the configured
    /// environment variable. Only meaningful when `use_real_data` is set.
    pub fn database_uri(&self) -> Result<String> {
        let var = &self.data.database_uri_env;
        let uri = std::env::var(var)
            .with_context(|| format!("Environment variable {} is not set", var))?;
        if uri.trim().is_empty() {
            anyhow::bail!("Environment variable {} is empty", var);
        }
        Ok(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:5000");
        assert!(!config.data.use_real_data);
        assert!(!config.data.test_connection);
        assert_eq!(config.data.collection, "posts");
        assert_eq!(
            config.locations.path,
            PathBuf::from("static/json/locations.json")
        );
        assert_eq!(config.speech.language, "en");
        assert!(!config.speech.slow);
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = Config::parse(
            r#"
[server]
bind_address = "0.0.0.0:8080"

[data]
use_real_data = true
database_uri_env = "CAMPUS_DB"

[speech]
base_url = "http://localhost:9000"
slow = true
"#,
        )
        .unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert!(config.data.use_real_data);
        assert_eq!(config.data.database_uri_env, "CAMPUS_DB");
        assert_eq!(config.speech.base_url, "http://localhost:9000");
        assert!(config.speech.slow);
        assert_eq!(config.speech.language, "en");
    }

    #[test]
    fn test_empty_language_rejected() {
        assert!(Config::parse("[speech]\nlanguage = \"\"").is_err());
    }

    #[test]
    fn test_missing_database_uri_is_error() {
        let mut config = Config::default();
        config.data.database_uri_env = "CAMPUS_PORTAL_TEST_UNSET_URI".to_string();
        let err = config.database_uri().unwrap_err();
        assert!(err.to_string().contains("CAMPUS_PORTAL_TEST_UNSET_URI"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[locations]\npath = \"data/locations.json\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.locations.path, PathBuf::from("data/locations.json"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = Config::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
