// TF-IDF document vectors: the default, fully local embedding provider.
//
// Training builds a vocabulary from the whole corpus (patents, abstracts and
// database rows alike): terms seen at least `min_count` times, ranked by
// their corpus-level TF-IDF weight, capped at `dimensions`. Each document is
// then projected onto that vocabulary as term frequency times smoothed IDF
// and scaled to unit length.
//
// Everything is keyed through ordered maps so the same corpus always yields
// the same vocabulary and the same vectors.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::Result;
use tracing::{debug, info};

use super::store::VectorStore;
use super::traits::EmbeddingProvider;
use crate::corpus::Corpus;

/// Provider name recorded in saved stores.
pub const TFIDF_EMBEDDER_NAME: &str = "tfidf";

/// TF-IDF embedding provider.
#[derive(Debug, Clone)]
pub struct TfIdfEmbedder {
    /// Maximum vocabulary size (vector length)
    pub dimensions: usize,
    /// Minimum number of corpus occurrences for a term to enter the vocabulary
    pub min_count: usize,
}

impl Default for TfIdfEmbedder {
    fn default() -> Self {
        Self {
            dimensions: 300,
            min_count: 5,
        }
    }
}

impl EmbeddingProvider for TfIdfEmbedder {
    fn name(&self) -> &str {
        TFIDF_EMBEDDER_NAME
    }

    fn train(&self, corpus: &Corpus) -> Result<VectorStore> {
        if corpus.is_empty() {
            anyhow::bail!("Corpus is empty — nothing to train on");
        }
        if self.dimensions == 0 {
            anyhow::bail!("TF-IDF dimensions must be greater than zero");
        }

        let docs: Vec<Vec<&str>> = corpus
            .texts()
            .into_iter()
            .map(|t| t.split_whitespace().collect())
            .collect();

        let stats = CorpusStats::collect(&docs);
        let vocabulary = self.build_vocabulary(&stats);

        if vocabulary.is_empty() {
            anyhow::bail!(
                "No term occurs at least {} times across {} documents — \
                 lower ABSTRACT2VEC_MIN_COUNT or add more text",
                self.min_count,
                docs.len()
            );
        }

        info!(
            documents = docs.len(),
            distinct_terms = stats.term_counts.len(),
            vocabulary = vocabulary.len(),
            "Built TF-IDF vocabulary"
        );

        let term_index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, (term, _))| (*term, i))
            .collect();
        let idf: Vec<f64> = vocabulary.iter().map(|(_, idf)| *idf).collect();

        let vectors: Vec<Vec<f64>> = docs
            .iter()
            .map(|tokens| document_vector(tokens, &term_index, &idf))
            .collect();

        let labels = corpus.labels().into_iter().map(str::to_string).collect();

        debug!(dimensions = vocabulary.len(), "Computed TF-IDF document vectors");

        VectorStore::new(TFIDF_EMBEDDER_NAME, vocabulary.len(), labels, vectors)
    }
}

impl TfIdfEmbedder {
    /// Select vocabulary terms with their IDF, highest corpus weight first.
    fn build_vocabulary<'a>(&self, stats: &CorpusStats<'a>) -> Vec<(&'a str, f64)> {
        let mut ranked: Vec<(&'a str, f64, f64)> = stats
            .term_counts
            .iter()
            .filter(|(_, count)| **count >= self.min_count)
            .map(|(&term, &count)| {
                let idf = stats.idf(term);
                (term, count as f64 * idf, idf)
            })
            .collect();

        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.dimensions);

        ranked.into_iter().map(|(term, _, idf)| (term, idf)).collect()
    }
}

/// Term and document frequencies over the whole corpus.
struct CorpusStats<'a> {
    doc_count: usize,
    term_counts: BTreeMap<&'a str, usize>,
    doc_freq: BTreeMap<&'a str, usize>,
}

impl<'a> CorpusStats<'a> {
    fn collect(docs: &[Vec<&'a str>]) -> Self {
        let mut term_counts = BTreeMap::new();
        let mut doc_freq = BTreeMap::new();

        for tokens in docs {
            let mut seen = BTreeSet::new();
            for &token in tokens {
                *term_counts.entry(token).or_insert(0) += 1;
                if seen.insert(token) {
                    *doc_freq.entry(token).or_insert(0) += 1;
                }
            }
        }

        Self {
            doc_count: docs.len(),
            term_counts,
            doc_freq,
        }
    }

    /// Smoothed inverse document frequency: ln((1 + n) / (1 + df)) + 1.
    fn idf(&self, term: &str) -> f64 {
        let df = self.doc_freq.get(term).copied().unwrap_or(0) as f64;
        ((1.0 + self.doc_count as f64) / (1.0 + df)).ln() + 1.0
    }
}

/// Project one document onto the vocabulary and scale to unit length.
fn document_vector(tokens: &[&str], term_index: &HashMap<&str, usize>, idf: &[f64]) -> Vec<f64> {
    let mut vector = vec![0.0_f64; idf.len()];
    if tokens.is_empty() {
        return vector;
    }

    for token in tokens {
        if let Some(&i) = term_index.get(token) {
            vector[i] += 1.0;
        }
    }

    let len = tokens.len() as f64;
    for (value, weight) in vector.iter_mut().zip(idf) {
        *value = *value / len * weight;
    }

    normalize_vector(&mut vector);
    vector
}

/// Scale a vector to unit length in place. Zero vectors are left alone.
pub fn normalize_vector(vector: &mut [f64]) {
    let norm = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}
