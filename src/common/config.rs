use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub retry: RetryConfig,
    pub rate_limit: RateLimitConfig,
    pub content: ContentConfig,
    pub videos: VideoConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5000,
        }
    }
}

/// Settings for the text-generation backend.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 60,
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 1024,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 2000,
        }
    }
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ContentConfig {
    /// Code examples longer than this are replaced by a short stub. Zero disables trimming.
    pub max_code_example_len: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            max_code_example_len: 200,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct VideoConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_results: usize,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            timeout_secs: 5,
            max_results: 3,
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from("config/default")
    }

    /// Loads `path` (extension optional, file optional) and applies `APP_*` overrides,
    /// e.g. `APP_PROVIDER__API_KEY`.
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let name = path.as_ref().to_string_lossy().into_owned();
        let builder = config::Config::builder()
            .add_source(config::File::with_name(&name).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        Ok(builder.build()?.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(dir.path().join("absent")).unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay(), Duration::from_secs(2));
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert_eq!(config.provider.max_output_tokens, 1024);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("service.toml");
        fs::write(
            &path,
            "[server]\nport = 8080\n\n[rate_limit]\nmax_requests = 2\nwindow_secs = 5\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.rate_limit.max_requests, 2);
        assert_eq!(config.rate_limit.window_secs, 5);
        assert_eq!(config.provider.model, "gemini-2.0-flash");
    }
}
