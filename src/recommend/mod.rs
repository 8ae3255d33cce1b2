//! Next-word recommendation engine.
//!
//! Blends exact nearest-neighbor search over word embeddings with a curated
//! category knowledge base and controlled randomness to always return the
//! requested number of relevant, non-duplicate words.
//!
//! # Architecture
//!
//! - `embeddings`: [`Embedder`] trait plus the fastembed-backed model
//! - `index`: exact L2 nearest-neighbor index over the vocabulary embeddings
//! - `categories`: compiled-in category -> members / related-categories data
//! - `service`: the multi-stage recommendation funnel, diversity sampler,
//!   and deterministic initial selector

pub mod categories;
pub mod embeddings;
mod index;
mod service;

pub use embeddings::{Embedder, EmbeddingModel};
pub use index::{IndexError, Neighbor, WordIndex};
pub use service::{initial_words, RecommendError, RecommendService, PREFERRED_STARTERS};

/// Default embedding model; multilingual because the vocabulary is Korean.
pub const DEFAULT_MODEL: &str = "paraphrase-multilingual-minilm-l12-v2";
