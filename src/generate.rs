//! Sentence generation from the user's chosen words.
//!
//! Talks to an Ollama-compatible HTTP backend: the chosen words are folded
//! into a Korean instruction prompt and the backend returns one natural
//! sentence. The client is blocking; async callers wrap it in
//! `tokio::task::block_in_place`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GenerationConfig;

/// Errors that can occur during sentence generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("word list is empty")]
    EmptyWords,

    #[error("cannot reach generation backend at {base_url}: {source}")]
    Unreachable {
        base_url: String,
        source: reqwest::Error,
    },

    #[error("generation backend returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("request failed: {0}")]
    Request(reqwest::Error),

    #[error("generation backend returned an empty sentence")]
    EmptySentence,
}

#[derive(Serialize)]
struct GenerateCall<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
}

#[derive(Deserialize)]
struct GenerateReply {
    #[serde(default)]
    response: String,
}

/// Client for the sentence-generation backend.
pub struct SentenceGenerator {
    client: reqwest::blocking::Client,
    config: GenerationConfig,
}

impl SentenceGenerator {
    pub fn new(config: GenerationConfig) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build http client");

        Self { client, config }
    }

    /// Generate one natural Korean sentence containing all of `words`.
    pub fn generate_sentence(&self, words: &[String]) -> Result<String, GenerateError> {
        if words.is_empty() {
            return Err(GenerateError::EmptyWords);
        }

        let call = GenerateCall {
            model: &self.config.model,
            prompt: build_prompt(words),
            stream: false,
            options: GenerateOptions {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
            },
        };

        log::info!("generating sentence for words: {words:?}");

        let response = self
            .client
            .post(format!("{}/api/generate", self.config.base_url))
            .json(&call)
            .send()
            .map_err(|err| self.classify(err))?;

        if !response.status().is_success() {
            return Err(GenerateError::Status(response.status()));
        }

        let reply: GenerateReply = response.json().map_err(GenerateError::Request)?;
        let sentence = reply.response.trim().to_string();
        if sentence.is_empty() {
            return Err(GenerateError::EmptySentence);
        }

        log::info!("generated sentence: {sentence}");
        Ok(sentence)
    }

    /// Probe the backend. Used at startup to warn early when it is down.
    pub fn check_connection(&self) -> bool {
        let probe = self
            .client
            .get(format!("{}/api/tags", self.config.base_url))
            .send();
        match probe {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                log::warn!("generation backend probe failed: {err}");
                false
            }
        }
    }

    fn classify(&self, err: reqwest::Error) -> GenerateError {
        if err.is_connect() || err.is_timeout() {
            GenerateError::Unreachable {
                base_url: self.config.base_url.clone(),
                source: err,
            }
        } else {
            GenerateError::Request(err)
        }
    }
}

/// Build the Korean instruction prompt for the generation backend.
fn build_prompt(words: &[String]) -> String {
    let words_str = words.join(", ");
    format!(
        "다음 단어들을 사용하여 자연스러운 한국어 문장을 만들어주세요.\n\
         단어들: {words_str}\n\n\
         규칙:\n\
         1. 모든 단어를 포함해야 합니다\n\
         2. 문법적으로 올바른 문장이어야 합니다\n\
         3. 자연스럽고 의미있는 문장이어야 합니다\n\
         4. 한 문장으로 작성해주세요\n\
         5. 문장만 출력하고 다른 설명은 하지 마세요\n\n\
         문장:"
    )
}
