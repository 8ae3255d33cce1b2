//! Exact nearest-neighbor index over the vocabulary embedding matrix.
//!
//! A flat (brute-force) L2 index: every query scans the full matrix. The
//! vocabulary is small enough that exact search beats maintaining an
//! approximate structure, and results are fully deterministic.

/// A single search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    /// Vocabulary row of the matched word.
    pub row: usize,
    /// Euclidean distance to the query vector.
    pub distance: f32,
}

/// Errors that can occur while building or querying the index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("embedding count mismatch: {words} vocabulary words but {embeddings} embeddings")]
    RowCountMismatch { words: usize, embeddings: usize },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Read-only L2 index over the embedding matrix.
///
/// Row `i` of the matrix is the embedding of vocabulary word `i`. Built once
/// at startup; a vocabulary change requires a full rebuild.
pub struct WordIndex {
    /// Row-major matrix, `rows * dimensions` values.
    matrix: Vec<f32>,
    dimensions: usize,
    rows: usize,
}

impl WordIndex {
    /// Build the index from the embeddings of `word_count` vocabulary words.
    ///
    /// Fails if the embedding count does not match the vocabulary length or
    /// any vector deviates from the dimensionality of the first.
    pub fn build(word_count: usize, embeddings: Vec<Vec<f32>>) -> Result<Self, IndexError> {
        if embeddings.len() != word_count {
            return Err(IndexError::RowCountMismatch {
                words: word_count,
                embeddings: embeddings.len(),
            });
        }

        let dimensions = embeddings.first().map(Vec::len).unwrap_or(0);
        let mut matrix = Vec::with_capacity(word_count * dimensions);
        for embedding in &embeddings {
            if embedding.len() != dimensions {
                return Err(IndexError::DimensionMismatch {
                    expected: dimensions,
                    got: embedding.len(),
                });
            }
            matrix.extend_from_slice(embedding);
        }

        Ok(Self {
            matrix,
            dimensions,
            rows: word_count,
        })
    }

    /// Number of indexed vectors.
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Expected query dimensionality.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Find up to `n` nearest rows to `query` by Euclidean distance.
    ///
    /// Results are ascending by distance; ties break by ascending row, so
    /// output is stable for a fixed index and query.
    pub fn search(&self, query: &[f32], n: usize) -> Result<Vec<Neighbor>, IndexError> {
        if query.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                got: query.len(),
            });
        }

        let mut results: Vec<Neighbor> = (0..self.rows)
            .map(|row| {
                let start = row * self.dimensions;
                let vector = &self.matrix[start..start + self.dimensions];
                Neighbor {
                    row,
                    distance: l2_distance(query, vector),
                }
            })
            .collect();

        results.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.row.cmp(&b.row))
        });
        results.truncate(n);

        Ok(results)
    }
}

/// Euclidean distance between two equal-length vectors.
fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
