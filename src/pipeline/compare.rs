// Comparison stage: pair patents with abstracts, score, and export.

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::embedding::VectorStore;
use crate::output::results;
use crate::scoring::metadata::CorpusDirectory;
use crate::scoring::{pair_and_score, SimilarityRecord};

/// Score every patent/abstract pair in `store` and write the results CSV.
///
/// Abstract titles are read from the corpus directory. Any failure here
/// aborts before the CSV is written.
pub fn run(config: &Config, store: &VectorStore) -> Result<Vec<SimilarityRecord>> {
    config.require_corpus()?;
    let metadata = CorpusDirectory::new(&config.corpus_dir);

    let records = pair_and_score(store.labels(), store, &metadata)?;
    results::export(&records, &config.output_path)?;

    info!(
        rows = records.len(),
        output = %config.output_path.display(),
        "Comparison complete"
    );
    Ok(records)
}

/// Load the saved vector store and compare.
pub fn run_from_disk(config: &Config) -> Result<(VectorStore, Vec<SimilarityRecord>)> {
    let store = VectorStore::load(&config.vectors_path)?;
    let records = run(config, &store)?;
    Ok((store, records))
}
