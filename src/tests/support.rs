//! Shared helpers for tests: a deterministic embedder and service builders.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::config::RecommendConfig;
use crate::recommend::categories;
use crate::recommend::embeddings::{Embedder, EmbeddingError};
use crate::recommend::RecommendService;
use crate::vocabulary::Vocabulary;

pub const MOCK_DIMENSIONS: usize = 16;

/// Deterministic stand-in for the embedding model: every text maps to a
/// fixed pseudo-random vector derived from its bytes. Distinct texts get
/// distinct vectors with overwhelming probability.
pub struct MockEmbedder;

pub fn mock_vector(text: &str) -> Vec<f32> {
    (0..MOCK_DIMENSIONS)
        .map(|dimension| {
            let mut hasher = DefaultHasher::new();
            (text, dimension).hash(&mut hasher);
            (hasher.finish() % 2000) as f32 / 1000.0 - 1.0
        })
        .collect()
}

impl Embedder for MockEmbedder {
    fn dimensions(&self) -> usize {
        MOCK_DIMENSIONS
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(mock_vector(text))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|text| mock_vector(text)).collect())
    }
}

pub fn vocab(words: &[&str]) -> Vocabulary {
    Vocabulary::from_words(words.iter().map(|w| w.to_string())).unwrap()
}

pub fn service_without_index(words: &[&str]) -> RecommendService {
    RecommendService::new(
        vocab(words),
        Box::new(MockEmbedder),
        &RecommendConfig::default(),
    )
}

pub fn service_with_index(words: &[&str]) -> RecommendService {
    let service = service_without_index(words);
    service.build_index().unwrap();
    service
}

/// Every category member plus a few uncategorized words, duplicate-free.
pub fn full_vocabulary() -> Vec<&'static str> {
    let mut words: Vec<&'static str> = Vec::new();
    for category in categories::names() {
        for member in categories::members(category) {
            if !words.contains(member) {
                words.push(*member);
            }
        }
    }
    words.extend(["나나", "바다", "컴퓨터"]);
    words
}
