//! Content similarity between catalog records.
//!
//! Each record is reduced to a bag of words over engine type, features and
//! body type; records are compared by cosine similarity of their term counts.
//! The matrix is built at load time and is not consulted by ranking.

use crate::tokenizer::{tokenize, TokenizerMode};
use crate::{VehicleIndex, VehicleRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityConfig {
    pub tokenizer: TokenizerMode,
}

pub fn build_feature_text(record: &VehicleRecord) -> String {
    format!("{} {} {}", record.engine_type, record.features, record.body_type)
}

/// Term counts per document over a shared vocabulary.
#[derive(Debug, Clone, Default)]
pub struct CountMatrix {
    pub vocabulary: BTreeMap<String, usize>,
    pub rows: Vec<Vec<u32>>,
}

impl CountMatrix {
    pub fn num_terms(&self) -> usize {
        self.vocabulary.len()
    }
}

pub fn vectorize<S: AsRef<str>>(texts: &[S], mode: TokenizerMode) -> CountMatrix {
    let docs: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t.as_ref(), mode)).collect();

    let mut vocabulary: BTreeMap<String, usize> = BTreeMap::new();
    for term in docs.iter().flatten() {
        vocabulary.entry(term.clone()).or_insert(0);
    }
    // Term ids follow sorted order.
    for (id, slot) in vocabulary.values_mut().enumerate() {
        *slot = id;
    }

    let rows = docs
        .iter()
        .map(|terms| {
            let mut row = vec![0u32; vocabulary.len()];
            for term in terms {
                row[vocabulary[term]] += 1;
            }
            row
        })
        .collect();
    CountMatrix { vocabulary, rows }
}

/// Square, symmetric matrix of pairwise cosine similarities, row-major.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get(&self, i: VehicleIndex, j: VehicleIndex) -> f64 {
        self.values[i * self.size + j]
    }

    pub fn row(&self, i: VehicleIndex) -> &[f64] {
        &self.values[i * self.size..(i + 1) * self.size]
    }

    /// The `k` records most similar to `i`, excluding `i` itself.
    pub fn most_similar(&self, i: VehicleIndex, k: usize) -> Vec<(VehicleIndex, f64)> {
        let mut others: Vec<(VehicleIndex, f64)> = self
            .row(i)
            .iter()
            .copied()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .collect();
        others.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        others.truncate(k);
        others
    }
}

pub fn similarity(matrix: &CountMatrix) -> SimilarityMatrix {
    let n = matrix.rows.len();
    let norms: Vec<f64> = matrix
        .rows
        .iter()
        .map(|row| row.iter().map(|&c| (c as f64) * (c as f64)).sum::<f64>().sqrt())
        .collect();

    let mut values = vec![0.0; n * n];
    for i in 0..n {
        if norms[i] == 0.0 {
            continue;
        }
        values[i * n + i] = 1.0;
        for j in (i + 1)..n {
            if norms[j] == 0.0 {
                continue;
            }
            let dot: f64 = matrix.rows[i]
                .iter()
                .zip(&matrix.rows[j])
                .map(|(&a, &b)| (a as f64) * (b as f64))
                .sum();
            let cos = (dot / (norms[i] * norms[j])).clamp(0.0, 1.0);
            values[i * n + j] = cos;
            values[j * n + i] = cos;
        }
    }
    SimilarityMatrix { size: n, values }
}

/// Feature text, vectorization and cosine similarity in one pass over the catalog.
pub fn build_index(records: &[VehicleRecord], config: SimilarityConfig) -> (CountMatrix, SimilarityMatrix) {
    let texts: Vec<String> = records.iter().map(build_feature_text).collect();
    let counts = vectorize(&texts, config.tokenizer);
    let sim = similarity(&counts);
    tracing::debug!(records = records.len(), terms = counts.num_terms(), "built similarity index");
    (counts, sim)
}
