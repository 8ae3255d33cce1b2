use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::recommend::DEFAULT_MODEL;

/// Default number of words offered per recommendation round
const DEFAULT_K: usize = 4;
/// Nearest-neighbor overfetch factor for the context-centroid stage
const DEFAULT_CONTEXT_SEARCH_FACTOR: usize = 3;
/// Nearest-neighbor overfetch factor for the input-word stage
const DEFAULT_WORD_SEARCH_FACTOR: usize = 4;

const DEFAULT_GENERATION_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_GENERATION_MODEL: &str = "gemma3:4b";
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 10;

const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

/// Configuration for the recommendation funnel
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecommendConfig {
    /// Words returned per recommendation round
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Neighbors fetched per requested word in the context-centroid stage
    #[serde(default = "default_context_search_factor")]
    pub context_search_factor: usize,

    /// Neighbors fetched per requested word in the input-word stage
    #[serde(default = "default_word_search_factor")]
    pub word_search_factor: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            default_k: DEFAULT_K,
            context_search_factor: DEFAULT_CONTEXT_SEARCH_FACTOR,
            word_search_factor: DEFAULT_WORD_SEARCH_FACTOR,
        }
    }
}

fn default_k() -> usize {
    DEFAULT_K
}

fn default_context_search_factor() -> usize {
    DEFAULT_CONTEXT_SEARCH_FACTOR
}

fn default_word_search_factor() -> usize {
    DEFAULT_WORD_SEARCH_FACTOR
}

/// Configuration for the embedding model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model name (e.g., "paraphrase-multilingual-minilm-l12-v2")
    #[serde(default = "default_embedding_model")]
    pub model: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

fn default_embedding_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// Configuration for the sentence-generation backend
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of an Ollama-compatible server
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// Model name passed to the backend
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling cutoff
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Request timeout in seconds
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GENERATION_BASE_URL.to_string(),
            model: DEFAULT_GENERATION_MODEL.to_string(),
            temperature: 0.7,
            top_p: 0.9,
            timeout_secs: DEFAULT_GENERATION_TIMEOUT_SECS,
        }
    }
}

fn default_generation_base_url() -> String {
    DEFAULT_GENERATION_BASE_URL.to_string()
}

fn default_generation_model() -> String {
    DEFAULT_GENERATION_MODEL.to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

fn default_generation_timeout_secs() -> u64 {
    DEFAULT_GENERATION_TIMEOUT_SECS
}

/// Configuration for the HTTP daemon
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address, host:port
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
        }
    }
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to the line-delimited vocabulary file.
    /// Empty means `<base path>/vocabulary.txt`.
    #[serde(default)]
    pub vocabulary_file: String,

    #[serde(default)]
    pub recommend: RecommendConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: String,
}

impl Config {
    fn validate(&mut self) {
        let rec = &self.recommend;
        if rec.default_k == 0 {
            panic!("recommend.default_k must be at least 1");
        }
        if rec.context_search_factor == 0 || rec.word_search_factor == 0 {
            panic!("recommend search factors must be at least 1");
        }

        let gen = &self.generation;
        if !(0.0..=2.0).contains(&gen.temperature) {
            panic!(
                "generation.temperature must be between 0.0 and 2.0, got {}",
                gen.temperature
            );
        }
        if !(0.0..=1.0).contains(&gen.top_p) {
            panic!(
                "generation.top_p must be between 0.0 and 1.0, got {}",
                gen.top_p
            );
        }
        if gen.timeout_secs == 0 {
            panic!("generation.timeout_secs must be greater than 0");
        }

        if self.server.listen.parse::<std::net::SocketAddr>().is_err() {
            panic!(
                "server.listen is not a valid host:port address: {}",
                self.server.listen
            );
        }
    }

    pub fn load_with(base_path: &str) -> Self {
        let config_path = Path::new(base_path).join("config.yaml");

        // create new if does not exist
        if !config_path.exists() {
            std::fs::write(
                &config_path,
                serde_yml::to_string(&Self::default()).unwrap().as_bytes(),
            )
            .expect("failed to write default config");
        }

        let config_str =
            std::fs::read_to_string(&config_path).expect("config file is not valid utf8");
        let mut config: Self = serde_yml::from_str(&config_str).expect("config is malformed");

        config.base_path = base_path.to_string();

        config.validate();

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config).unwrap() {
            config.save();
        }

        config
    }

    pub fn save(&self) {
        let config_path = Path::new(&self.base_path).join("config.yaml");
        let config_str = serde_yml::to_string(&self).unwrap();
        std::fs::write(config_path, config_str.as_bytes()).expect("failed to write config");
    }

    /// Resolved vocabulary file path.
    pub fn vocabulary_path(&self) -> PathBuf {
        if self.vocabulary_file.is_empty() {
            Path::new(&self.base_path).join("vocabulary.txt")
        } else {
            PathBuf::from(&self.vocabulary_file)
        }
    }

    /// Base directory for derived data (model cache).
    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}

/// Resolve the application base directory and make sure it exists.
///
/// `WORDCUE_BASE_PATH` overrides the default `~/.local/share/wordcue`.
pub fn base_path() -> anyhow::Result<String> {
    use anyhow::Context;

    let base_path = std::env::var("WORDCUE_BASE_PATH").unwrap_or_else(|_| {
        let home = homedir::my_home()
            .expect("Could not determine home directory")
            .expect("Home directory path is empty");
        format!("{}/.local/share/wordcue", home.to_string_lossy())
    });

    std::fs::create_dir_all(&base_path).context("Failed to create application base directory")?;

    Ok(base_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_yaml() {
        let config = Config::default();
        let yaml = serde_yml::to_string(&config).unwrap();
        let parsed: Config = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed.recommend.default_k, DEFAULT_K);
        assert_eq!(parsed.embedding.model, DEFAULT_MODEL);
        assert_eq!(parsed.server.listen, DEFAULT_LISTEN);
    }

    #[test]
    fn test_missing_sections_get_defaults() {
        let parsed: Config = serde_yml::from_str("vocabulary_file: /tmp/words.txt\n").unwrap();
        assert_eq!(parsed.vocabulary_file, "/tmp/words.txt");
        assert_eq!(parsed.recommend.context_search_factor, 3);
        assert_eq!(parsed.generation.base_url, DEFAULT_GENERATION_BASE_URL);
    }

    #[test]
    fn test_load_with_creates_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_str().unwrap();

        let config = Config::load_with(base);
        assert!(dir.path().join("config.yaml").exists());
        assert_eq!(config.recommend.default_k, DEFAULT_K);
        assert_eq!(config.vocabulary_path(), dir.path().join("vocabulary.txt"));
    }

    #[test]
    fn test_explicit_vocabulary_file_wins() {
        let mut config = Config::default();
        config.vocabulary_file = "/data/words.txt".to_string();
        assert_eq!(config.vocabulary_path(), PathBuf::from("/data/words.txt"));
    }

    #[test]
    #[should_panic(expected = "default_k")]
    fn test_zero_default_k_panics() {
        let mut config = Config::default();
        config.recommend.default_k = 0;
        config.validate();
    }

    #[test]
    #[should_panic(expected = "server.listen")]
    fn test_bad_listen_address_panics() {
        let mut config = Config::default();
        config.server.listen = "not-an-address".to_string();
        config.validate();
    }
}
