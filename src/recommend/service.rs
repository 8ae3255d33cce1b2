//! Recommendation service: the multi-stage funnel that always produces
//! exactly `k` next-word candidates.
//!
//! The service bundles the process-wide read-only state (vocabulary,
//! similarity index, category knowledge base, embedding model) and threads a
//! per-call exclusion set through an ordered funnel of candidate stages:
//!
//! 1. one pick from the input word's own category
//! 2. one pick per related category
//! 3. nearest neighbors of the context centroid
//! 4. nearest neighbors of the input word
//! 5. random vocabulary fallback
//!
//! Later stages only run while the result is still short of `k`. Randomized
//! stages take the caller's `Rng` so tests can seed them.

use std::collections::HashSet;
use std::sync::RwLock;

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use crate::config::RecommendConfig;
use crate::recommend::categories;
use crate::recommend::embeddings::{Embedder, EmbeddingError};
use crate::recommend::index::{IndexError, Neighbor, WordIndex};
use crate::vocabulary::Vocabulary;

/// Starting words offered to a fresh session, in preference order.
pub const PREFERRED_STARTERS: &[&str] = &[
    "안녕", "오늘", "날씨", "좋다", "나", "너", "우리", "사람", "시간", "하다",
];

/// Errors that can occur during recommendation.
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("similarity index not built")]
    NotBuilt,

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Process-wide recommendation state.
///
/// Constructed once at startup; all request paths read it concurrently. The
/// index slot is swapped as a whole so a future vocabulary reload can publish
/// a rebuilt index atomically.
pub struct RecommendService {
    vocabulary: Vocabulary,
    embedder: Box<dyn Embedder>,
    index: RwLock<Option<WordIndex>>,
    context_search_factor: usize,
    word_search_factor: usize,
}

impl RecommendService {
    /// Create a service over a loaded vocabulary. The similarity index is
    /// not available until [`build_index`](Self::build_index) completes.
    pub fn new(vocabulary: Vocabulary, embedder: Box<dyn Embedder>, config: &RecommendConfig) -> Self {
        Self {
            vocabulary,
            embedder,
            index: RwLock::new(None),
            context_search_factor: config.context_search_factor,
            word_search_factor: config.word_search_factor,
        }
    }

    /// Embed the full vocabulary in one batched call and build the exact L2
    /// index over the result. Blocking and potentially slow; run during
    /// startup, before serving.
    pub fn build_index(&self) -> Result<(), RecommendError> {
        log::info!(
            "generating embeddings for {} vocabulary words",
            self.vocabulary.len()
        );
        let embeddings = self.embedder.embed_batch(self.vocabulary.words())?;
        let index = WordIndex::build(self.vocabulary.len(), embeddings)?;
        log::info!(
            "similarity index built: {} vectors, {} dimensions",
            index.len(),
            index.dimensions()
        );

        let mut guard = self
            .index
            .write()
            .map_err(|e| RecommendError::Internal(format!("Lock poisoned: {}", e)))?;
        *guard = Some(index);
        Ok(())
    }

    /// Whether the similarity index is ready for vector searches.
    pub fn is_built(&self) -> bool {
        self.index
            .read()
            .ok()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Exact-match membership test for the caller-boundary pre-check.
    pub fn word_exists(&self, word: &str) -> bool {
        self.vocabulary.contains(word)
    }

    /// Deterministic starting words for a fresh session.
    ///
    /// Needs only the vocabulary, so it works before the index is built.
    pub fn initial_words(&self, k: usize) -> Vec<String> {
        initial_words(&self.vocabulary, k)
    }

    /// Recommend `k` next words for `word` given the sentence built so far.
    ///
    /// `context` is the ordered list of previously accepted words;
    /// `exclude_words` is an additional caller-supplied exclusion set. The
    /// result is acceptance-ordered, exactly `k` long, pairwise distinct,
    /// and disjoint from `word`, `context`, and `exclude_words`.
    ///
    /// `word` is not required to be in the vocabulary, but stages 1-2
    /// degrade to "no category" for unknown words; callers wanting
    /// category-aware behavior should pre-check with
    /// [`word_exists`](Self::word_exists) and route unknown words to
    /// [`initial_words`](Self::initial_words).
    pub fn recommend<R>(
        &self,
        word: &str,
        k: usize,
        context: &[String],
        exclude_words: &[String],
        rng: &mut R,
    ) -> Result<Vec<String>, RecommendError>
    where
        R: Rng + ?Sized,
    {
        let mut excluded: HashSet<String> = exclude_words.iter().cloned().collect();
        excluded.extend(context.iter().cloned());
        excluded.insert(word.to_string());
        self.validate(k, &excluded)?;

        let mut accepted: Vec<String> = Vec::with_capacity(k);
        let category = categories::category_of(word);

        // Stage 1: one pick from the input word's own category.
        if let Some(category) = category {
            let mut members = categories::members_in_vocabulary(category, &self.vocabulary);
            members.shuffle(rng);
            if let Some(pick) = members.into_iter().find(|m| !excluded.contains(*m)) {
                excluded.insert(pick.to_string());
                accepted.push(pick.to_string());
            }
        }

        // Stage 2: one pick per related category, in declared order.
        if let Some(category) = category {
            for related in categories::related(category) {
                if accepted.len() >= k {
                    break;
                }
                let pool: Vec<&str> = categories::members_in_vocabulary(related, &self.vocabulary)
                    .into_iter()
                    .filter(|m| !excluded.contains(*m))
                    .collect();
                if let Some(pick) = pool.choose(rng) {
                    excluded.insert(pick.to_string());
                    accepted.push(pick.to_string());
                }
            }
        }

        // Stage 3: nearest neighbors of the context centroid.
        if !context.is_empty() && accepted.len() < k {
            let embeddings = self.embedder.embed_batch(context)?;
            let query = centroid(&embeddings);
            let neighbors = self.search_index(&query, self.context_search_factor * k)?;
            self.accept_neighbors(&neighbors, k, &mut accepted, &mut excluded);
        }

        // Stage 4: nearest neighbors of the input word itself.
        if accepted.len() < k {
            let query = self.embedder.embed(word)?;
            let neighbors = self.search_index(&query, self.word_search_factor * k)?;
            self.accept_neighbors(&neighbors, k, &mut accepted, &mut excluded);
        }

        // Stage 5: random fallback. Terminates because `validate` guarantees
        // at least k selectable words remain.
        self.fill_random(k, &mut accepted, &mut excluded, rng);

        Ok(accepted)
    }

    /// Recommend `k` words spanning distinct categories.
    ///
    /// Used when the sentence crosses a topic boundary: the caller wants
    /// topical spread, not similarity, so this never consults the index.
    pub fn recommend_diverse<R>(
        &self,
        k: usize,
        exclude_words: &[String],
        rng: &mut R,
    ) -> Result<Vec<String>, RecommendError>
    where
        R: Rng + ?Sized,
    {
        let mut excluded: HashSet<String> = exclude_words.iter().cloned().collect();
        self.validate(k, &excluded)?;

        let mut accepted: Vec<String> = Vec::with_capacity(k);
        let mut names = categories::names();
        names.shuffle(rng);

        for category in names {
            if accepted.len() >= k {
                break;
            }
            let pool: Vec<&str> = categories::members_in_vocabulary(category, &self.vocabulary)
                .into_iter()
                .filter(|m| !excluded.contains(*m))
                .collect();
            if let Some(pick) = pool.choose(rng) {
                excluded.insert(pick.to_string());
                accepted.push(pick.to_string());
            }
        }

        self.fill_random(k, &mut accepted, &mut excluded, rng);

        Ok(accepted)
    }

    /// Reject requests the funnel cannot satisfy: `k` of zero, or more words
    /// requested than the vocabulary can supply once exclusions are applied
    /// (the random fallback would never terminate).
    fn validate(&self, k: usize, excluded: &HashSet<String>) -> Result<(), RecommendError> {
        if k == 0 {
            return Err(RecommendError::InvalidRequest(
                "k must be at least 1".to_string(),
            ));
        }

        let excluded_in_vocabulary = excluded
            .iter()
            .filter(|word| self.vocabulary.contains(word.as_str()))
            .count();
        let available = self.vocabulary.len() - excluded_in_vocabulary;
        if k > available {
            return Err(RecommendError::InvalidRequest(format!(
                "k={} exceeds the {} selectable vocabulary words",
                k, available
            )));
        }

        Ok(())
    }

    fn search_index(&self, query: &[f32], n: usize) -> Result<Vec<Neighbor>, RecommendError> {
        let guard = self
            .index
            .read()
            .map_err(|e| RecommendError::Internal(format!("Lock poisoned: {}", e)))?;
        let index = guard.as_ref().ok_or(RecommendError::NotBuilt)?;
        Ok(index.search(query, n)?)
    }

    /// Accept non-excluded neighbors in ascending-distance order until the
    /// result reaches `k`.
    fn accept_neighbors(
        &self,
        neighbors: &[Neighbor],
        k: usize,
        accepted: &mut Vec<String>,
        excluded: &mut HashSet<String>,
    ) {
        for neighbor in neighbors {
            if accepted.len() >= k {
                break;
            }
            if let Some(word) = self.vocabulary.word(neighbor.row) {
                if !excluded.contains(word) {
                    excluded.insert(word.to_string());
                    accepted.push(word.to_string());
                }
            }
        }
    }

    /// Draw uniformly random vocabulary words until the result reaches `k`.
    /// Callers must have validated that enough non-excluded words exist.
    fn fill_random<R>(
        &self,
        k: usize,
        accepted: &mut Vec<String>,
        excluded: &mut HashSet<String>,
        rng: &mut R,
    ) where
        R: Rng + ?Sized,
    {
        while accepted.len() < k {
            if let Some(word) = self.vocabulary.words().choose(rng) {
                if !excluded.contains(word.as_str()) {
                    excluded.insert(word.clone());
                    accepted.push(word.clone());
                }
            }
        }
    }
}

/// Deterministic bootstrap list for a fresh session: the preference list
/// filtered to the vocabulary, topped up from the vocabulary in stored
/// order. No randomness and no index use.
pub fn initial_words(vocabulary: &Vocabulary, k: usize) -> Vec<String> {
    let mut words: Vec<String> = Vec::with_capacity(k);

    for starter in PREFERRED_STARTERS {
        if words.len() >= k {
            break;
        }
        if vocabulary.contains(starter) && !words.iter().any(|w| w == starter) {
            words.push(starter.to_string());
        }
    }

    for word in vocabulary.words() {
        if words.len() >= k {
            break;
        }
        if !words.iter().any(|w| w == word) {
            words.push(word.clone());
        }
    }

    words
}

/// Arithmetic mean of a non-empty set of equal-length vectors.
fn centroid(embeddings: &[Vec<f32>]) -> Vec<f32> {
    let dimensions = embeddings.first().map(Vec::len).unwrap_or(0);
    let mut mean = vec![0.0f32; dimensions];
    for embedding in embeddings {
        for (slot, value) in mean.iter_mut().zip(embedding.iter()) {
            *slot += value;
        }
    }
    let count = embeddings.len().max(1) as f32;
    for slot in &mut mean {
        *slot /= count;
    }
    mean
}
