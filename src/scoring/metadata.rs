// Abstract header metadata: author and title lines used in the results.
//
// Abstract files carry the authors on line 0 and the title on line 3. The
// pairing engine asks a metadata source for these by label; the default
// source re-reads the file from the corpus directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::corpus::{decode_text, split_lines};

/// Abstract files need at least this many lines to carry a title.
pub const MIN_HEADER_LINES: usize = 4;

const AUTHOR_LINE: usize = 0;
const TITLE_LINE: usize = 3;

/// Header fields of an abstract file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbstractMetadata {
    pub author: String,
    pub title: String,
}

impl AbstractMetadata {
    /// Parse the header out of an abstract file's contents.
    ///
    /// Fails when the file has fewer than `MIN_HEADER_LINES` lines.
    pub fn parse(label: &str, raw: &str) -> Result<Self> {
        let lines = split_lines(raw);
        if lines.len() < MIN_HEADER_LINES {
            anyhow::bail!(
                "Malformed abstract {label}: {} lines, need at least {MIN_HEADER_LINES} \
                 for author and title",
                lines.len()
            );
        }

        Ok(Self {
            author: strip_line_breaks(lines[AUTHOR_LINE]).to_string(),
            title: strip_line_breaks(lines[TITLE_LINE]).to_string(),
        })
    }
}

/// Trim surrounding tab, newline, and carriage-return characters.
pub fn strip_line_breaks(s: &str) -> &str {
    s.trim_matches(|c| matches!(c, '\t' | '\n' | '\r'))
}

/// Where the pairing engine gets abstract metadata from.
pub trait AbstractMetadataSource {
    /// Look up the header of the abstract with this label.
    fn metadata(&self, label: &str) -> Result<AbstractMetadata>;
}

/// Reads abstract headers from files in the corpus directory.
#[derive(Debug, Clone)]
pub struct CorpusDirectory {
    dir: PathBuf,
}

impl CorpusDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl AbstractMetadataSource for CorpusDirectory {
    fn metadata(&self, label: &str) -> Result<AbstractMetadata> {
        let path = self.dir.join(label);
        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read abstract {}", path.display()))?;
        AbstractMetadata::parse(label, &decode_text(&bytes))
    }
}

impl AbstractMetadataSource for HashMap<String, AbstractMetadata> {
    fn metadata(&self, label: &str) -> Result<AbstractMetadata> {
        self.get(label)
            .cloned()
            .with_context(|| format!("No metadata for abstract {label}"))
    }
}
