// Results export: one CSV row per scored (patent, abstract) pair.
//
// Dialect: comma delimiter, `|` as the quote character, fields quoted only
// when they contain a delimiter, quote, or line break, CRLF line endings.

use std::path::Path;

use anyhow::{Context, Result};
use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::scoring::SimilarityRecord;

/// Default results file name.
pub const DEFAULT_RESULTS_FILE: &str = "FINALresults.csv";

const QUOTE_CHAR: u8 = b'|';

/// A results row as written to the CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(rename = "PatentName")]
    pub patent_name: String,
    #[serde(rename = "AbstractFile")]
    pub abstract_file: String,
    #[serde(rename = "PercentSimilarity")]
    pub percent_similarity: String,
    #[serde(rename = "AbstractTitle")]
    pub abstract_title: String,
}

impl From<&SimilarityRecord> for ResultRow {
    fn from(record: &SimilarityRecord) -> Self {
        Self {
            patent_name: record.patent_label.clone(),
            abstract_file: record.abstract_label.clone(),
            percent_similarity: record.percent(),
            abstract_title: record.abstract_title.clone(),
        }
    }
}

/// Write the header and one row per record, replacing any existing file.
pub fn export(records: &[SimilarityRecord], path: &Path) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(b',')
        .quote(QUOTE_CHAR)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::CRLF)
        .from_path(path)
        .with_context(|| format!("Failed to create results file {}", path.display()))?;

    if records.is_empty() {
        // serialize() only emits the header alongside the first row
        writer.write_record(["PatentName", "AbstractFile", "PercentSimilarity", "AbstractTitle"])?;
    }

    for record in records {
        writer
            .serialize(ResultRow::from(record))
            .with_context(|| format!("Failed to write results to {}", path.display()))?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush results to {}", path.display()))?;

    info!(path = %path.display(), rows = records.len(), "Wrote results");
    Ok(())
}

/// Parse a results file written by `export`.
pub fn read_results(path: &Path) -> Result<Vec<ResultRow>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b',')
        .quote(QUOTE_CHAR)
        .from_path(path)
        .with_context(|| format!("Failed to open results file {}", path.display()))?;

    reader
        .deserialize()
        .collect::<Result<Vec<ResultRow>, _>>()
        .with_context(|| format!("Failed to parse results file {}", path.display()))
}
