// Batch pipeline: load corpus, train vectors, pair and score, export.
//
// Each stage is a plain synchronous function taking explicit configuration,
// so `run` is just `train` followed by `compare` on the in-memory store.

pub mod compare;
pub mod train;

use anyhow::Result;

use crate::config::Config;
use crate::scoring::SimilarityRecord;

/// Train, then compare using the freshly trained vectors.
pub fn run(config: &Config) -> Result<(train::TrainOutcome, Vec<SimilarityRecord>)> {
    let outcome = train::run(config)?;
    let records = compare::run(config, &outcome.store)?;
    Ok((outcome, records))
}
