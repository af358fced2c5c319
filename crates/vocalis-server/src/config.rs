use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use vocalis_ai::{AiProvider, DEFAULT_MAX_TOKENS, VoiceSettings};
use vocalis_core::history::DEFAULT_CAPACITY;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub history_capacity: usize,
    pub ai: AiConfig,
    pub voice: VoiceSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    pub provider: AiProvider,
    pub max_tokens: u32,
    pub perplexity_base_url: Option<String>,
    pub openai_base_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    history: HistorySection,
    #[serde(default)]
    ai: AiSection,
    #[serde(default)]
    voice: VoiceSection,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HistorySection {
    #[serde(default = "default_capacity")]
    capacity: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AiSection {
    #[serde(default)]
    provider: AiProvider,
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
    #[serde(default)]
    perplexity_base_url: Option<String>,
    #[serde(default)]
    openai_base_url: Option<String>,
}

impl Default for AiSection {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            max_tokens: default_max_tokens(),
            perplexity_base_url: None,
            openai_base_url: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct VoiceSection {
    #[serde(default)]
    rate: Option<u32>,
    #[serde(default)]
    volume: Option<f32>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_file_config(FileConfig::default())
    }
}

impl ServerConfig {
    /// Load from `VOCALIS_CONFIG` or `./vocalis.toml`, else from the environment.
    pub fn load() -> anyhow::Result<Self> {
        if let Some(path) = config_path() {
            return Self::from_file(&path);
        }

        Ok(Self::from_env())
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|err| anyhow::anyhow!("Failed to read config {}: {}", path.display(), err))?;
        let parsed: FileConfig = toml::from_str(&contents)
            .map_err(|err| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), err))?;
        tracing::info!(path = %path.display(), "Loaded server config");
        Ok(Self::from_file_config(parsed))
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("VOCALIS_HOST").unwrap_or_else(default_host);
        let port = lookup("VOCALIS_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or_else(default_port);
        let history_capacity = lookup("VOCALIS_HISTORY_CAPACITY")
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|capacity| *capacity > 0)
            .unwrap_or_else(default_capacity);
        let provider = lookup("VOCALIS_AI_PROVIDER")
            .and_then(|value| value.parse::<AiProvider>().ok())
            .unwrap_or_default();
        let max_tokens = lookup("VOCALIS_MAX_TOKENS")
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or_else(default_max_tokens);

        Self {
            host,
            port,
            history_capacity,
            ai: AiConfig {
                provider,
                max_tokens,
                perplexity_base_url: lookup("VOCALIS_PERPLEXITY_BASE_URL"),
                openai_base_url: lookup("VOCALIS_OPENAI_BASE_URL"),
            },
            voice: VoiceSettings::default(),
        }
    }

    fn from_file_config(file: FileConfig) -> Self {
        let defaults = VoiceSettings::default();
        Self {
            host: file.server.host,
            port: file.server.port,
            history_capacity: file.history.capacity.max(1),
            ai: AiConfig {
                provider: file.ai.provider,
                max_tokens: file.ai.max_tokens,
                perplexity_base_url: file.ai.perplexity_base_url,
                openai_base_url: file.ai.openai_base_url,
            },
            voice: VoiceSettings::new(
                file.voice.rate.unwrap_or(defaults.rate),
                file.voice.volume.unwrap_or(defaults.volume),
            ),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("VOCALIS_CONFIG") {
        return Some(PathBuf::from(path));
    }

    let local = Path::new("vocalis.toml");
    local.exists().then(|| local.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_env_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.history_capacity, 100);
        assert_eq!(config.ai.provider, AiProvider::Perplexity);
        assert_eq!(config.ai.max_tokens, 500);
        assert_eq!(config.voice, VoiceSettings::default());
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("VOCALIS_HOST", "127.0.0.1"),
            ("VOCALIS_PORT", "8081"),
            ("VOCALIS_HISTORY_CAPACITY", "25"),
            ("VOCALIS_AI_PROVIDER", "openai"),
            ("VOCALIS_MAX_TOKENS", "64"),
            ("VOCALIS_OPENAI_BASE_URL", "http://localhost:9000/v1"),
        ]));
        assert_eq!(config.bind_address(), "127.0.0.1:8081");
        assert_eq!(config.history_capacity, 25);
        assert_eq!(config.ai.provider, AiProvider::OpenAi);
        assert_eq!(config.ai.max_tokens, 64);
        assert_eq!(
            config.ai.openai_base_url.as_deref(),
            Some("http://localhost:9000/v1")
        );
    }

    #[test]
    fn test_env_invalid_values_fall_back() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("VOCALIS_PORT", "not-a-port"),
            ("VOCALIS_HISTORY_CAPACITY", "0"),
            ("VOCALIS_AI_PROVIDER", "skynet"),
        ]));
        assert_eq!(config.port, 5000);
        assert_eq!(config.history_capacity, 100);
        assert_eq!(config.ai.provider, AiProvider::Perplexity);
    }

    #[test]
    fn test_file_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9000

[history]
capacity = 10

[ai]
provider = "openai"
max_tokens = 128

[voice]
rate = 400
volume = 0.5
"#
        )
        .unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.ai.provider, AiProvider::OpenAi);
        assert_eq!(config.ai.max_tokens, 128);
        assert_eq!(config.voice, VoiceSettings::new(300, 0.5));
    }

    #[test]
    fn test_file_config_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();

        let err = ServerConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_missing_file() {
        let err = ServerConfig::from_file(Path::new("/nonexistent/vocalis.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
