use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_DICTIONARY_URL: &str = "https://api.api-ninjas.com/v1/dictionary";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub dictionary: DictionaryConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Character budget for the text sent to the model
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    /// Upload size limit in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            max_file_size: default_max_file_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
    pub path: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
            path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_dictionary_url")]
    pub base_url: String,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_dictionary_url(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: Option<String>,
    #[serde(default)]
    pub token: String,
}

impl RemoteConfig {
    /// Remote persistence is only used with both a server and a token
    pub fn is_authenticated(&self) -> bool {
        self.base_url.as_deref().is_some_and(|u| !u.trim().is_empty()) && !self.token.is_empty()
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_temperature() -> f64 {
    0.3
}

fn default_max_chars() -> usize {
    3000
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_history_capacity() -> usize {
    30
}

fn default_dictionary_url() -> String {
    DEFAULT_DICTIONARY_URL.to_string()
}

impl Config {
    /// Get the configuration directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("dumbifier");
        Ok(config_dir)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            anyhow::bail!(
                "Configuration file not found at {}. Run 'dumbifier init' first.",
                config_path.display()
            );
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file at {}", config_path.display()))
    }

    /// Load the config file if there is one, otherwise use defaults
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load()
        } else {
            let mut config = Self::default();
            config.expand_env_vars();
            Ok(config)
        }
    }

    fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        if config.history.capacity == 0 {
            anyhow::bail!("history.capacity must be at least 1");
        }
        config.expand_env_vars();
        Ok(config)
    }

    /// Expand environment variables in secrets, falling back to the
    /// conventional variables when a key is left empty
    fn expand_env_vars(&mut self) {
        self.openai.api_key = expand_env_var(&self.openai.api_key);
        if self.openai.api_key.is_empty() {
            self.openai.api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        }

        self.dictionary.api_key = expand_env_var(&self.dictionary.api_key);
        if self.dictionary.api_key.is_empty() {
            self.dictionary.api_key = std::env::var("API_NINJAS_KEY").unwrap_or_default();
        }

        self.remote.token = expand_env_var(&self.remote.token);
    }

    /// Where the local history lives
    pub fn history_path(&self) -> Result<PathBuf> {
        match &self.history.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("history.json")),
        }
    }

    /// Config written by `dumbifier init`
    pub fn template() -> Self {
        Self {
            openai: OpenAiConfig {
                api_key: "${OPENAI_API_KEY}".to_string(),
                ..OpenAiConfig::default()
            },
            analysis: AnalysisConfig::default(),
            history: HistoryConfig::default(),
            dictionary: DictionaryConfig {
                api_key: "${API_NINJAS_KEY}".to_string(),
                base_url: default_dictionary_url(),
            },
            remote: RemoteConfig {
                base_url: None,
                token: "${DUMBIFIER_TOKEN}".to_string(),
            },
        }
    }
}

/// Expand environment variable references like ${VAR_NAME}
fn expand_env_var(value: &str) -> String {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).unwrap_or_default()
    } else if let Some(var_name) = value.strip_prefix('$') {
        std::env::var(var_name).unwrap_or_default()
    } else {
        value.to_string()
    }
}
