// Pairing & scoring: compare each patent with the abstracts that cite it.
//
// Abstracts are named after the patent they belong to: patent
// "98_US20050142162.txt" has number "98", and every abstract labelled
// "98_<anything>" is one of its candidates. Each (patent, abstract) pair gets
// one record with the cosine similarity of their vectors.
//
// Patents are visited in label order and abstracts in the order the labels
// were given, so the same inputs always produce the same rows.

use anyhow::Result;
use tracing::{debug, info};

use super::metadata::{AbstractMetadata, AbstractMetadataSource};
use super::similarity::{cosine_similarity, format_percent};
use crate::corpus::label::abstract_belongs_to;
use crate::corpus::DocumentKind;
use crate::embedding::VectorStore;

/// The similarity between one patent and one of its abstracts.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityRecord {
    pub patent_label: String,
    pub abstract_label: String,
    /// Cosine similarity in [-1.0, 1.0]
    pub similarity: f64,
    /// Abstract title, trimmed of surrounding tabs and line breaks
    pub abstract_title: String,
}

impl SimilarityRecord {
    /// Similarity rendered as a percent string ("87.5%").
    pub fn percent(&self) -> String {
        format_percent(self.similarity)
    }
}

/// Pair every patent with its abstracts and score each pair.
///
/// Database-sourced labels never take part. Metadata is read for every
/// abstract up front; a malformed abstract or a label without a vector
/// aborts the whole run.
pub fn pair_and_score<L: AsRef<str>>(
    labels: &[L],
    vectors: &VectorStore,
    metadata: &dyn AbstractMetadataSource,
) -> Result<Vec<SimilarityRecord>> {
    let mut patents: Vec<(&str, String)> = Vec::new();
    let mut abstracts: Vec<(&str, AbstractMetadata)> = Vec::new();

    for label in labels {
        let label = label.as_ref();
        match DocumentKind::from_label(label) {
            DocumentKind::Patent { number } => patents.push((label, number)),
            DocumentKind::Abstract => abstracts.push((label, metadata.metadata(label)?)),
            DocumentKind::TrainingOnly => {}
        }
    }

    patents.sort_by(|a, b| a.0.cmp(b.0));

    info!(
        patents = patents.len(),
        abstracts = abstracts.len(),
        "Comparing patents to abstracts"
    );

    let mut records = Vec::new();
    for (patent_label, number) in &patents {
        let patent_vec = lookup(vectors, patent_label)?;

        for (abstract_label, meta) in &abstracts {
            if !abstract_belongs_to(abstract_label, number) {
                continue;
            }

            let abstract_vec = lookup(vectors, abstract_label)?;
            let similarity = cosine_similarity(patent_vec, abstract_vec);

            debug!(
                patent = %patent_label,
                abstract_label = %abstract_label,
                similarity = similarity,
                "Scored pair"
            );

            records.push(SimilarityRecord {
                patent_label: patent_label.to_string(),
                abstract_label: abstract_label.to_string(),
                similarity,
                abstract_title: meta.title.clone(),
            });
        }
    }

    info!(records = records.len(), "Scored patent/abstract pairs");
    Ok(records)
}

fn lookup<'a>(vectors: &'a VectorStore, label: &str) -> Result<&'a [f64]> {
    match vectors.get(label) {
        Some(v) => Ok(v),
        None => anyhow::bail!(
            "No vector for {label} — the vector store does not match this corpus. \
             Re-run `abstract2vec train`."
        ),
    }
}

/// Records ordered by similarity, highest first, capped at `n`.
///
/// Ties keep pairing order.
pub fn top_matches(records: &[SimilarityRecord], n: usize) -> Vec<&SimilarityRecord> {
    let mut ranked: Vec<&SimilarityRecord> = records.iter().collect();
    ranked.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    ranked.truncate(n);
    ranked
}
