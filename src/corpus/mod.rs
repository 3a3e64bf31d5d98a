// Corpus: the labeled documents an embedding provider trains on.
//
// Documents come from two places: text files in the corpus directory
// (patents and abstracts) and rows of a SQLite table (training-only text).
// Each document is classified once when it is loaded.

pub mod database;
pub mod label;
pub mod loader;

use std::fmt;

pub use label::DocumentKind;

/// A single cleaned, labeled document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Unique label: the source file name or "mimic<index>".
    pub label: String,
    pub kind: DocumentKind,
    /// Normalized text (space-separated tokens).
    pub text: String,
}

/// Why a document was left out of the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Abstract file with fewer lines than the header format requires.
    MalformedDocument { lines: usize },
    /// Cleaned abstract text was empty or started with "null".
    NullContent,
    /// The file could not be read.
    Unreadable(String),
    /// Database row with a NULL text column.
    MissingText,
    /// Another document already uses this label.
    DuplicateLabel,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MalformedDocument { lines } => {
                write!(
                    f,
                    "malformed abstract ({lines} lines, need {})",
                    loader::MIN_ABSTRACT_LINES
                )
            }
            SkipReason::NullContent => write!(f, "null content"),
            SkipReason::Unreadable(e) => write!(f, "unreadable: {e}"),
            SkipReason::MissingText => write!(f, "missing TEXT value"),
            SkipReason::DuplicateLabel => write!(f, "duplicate label"),
        }
    }
}

/// A document that was dropped during loading, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedDocument {
    pub label: String,
    pub reason: SkipReason,
}

/// The ordered set of documents produced by the loader.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub documents: Vec<Document>,
    pub skipped: Vec<SkippedDocument>,
}

impl Corpus {
    /// Document labels, in corpus order.
    pub fn labels(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.label.as_str()).collect()
    }

    /// Cleaned texts, positionally aligned with `labels()`.
    pub fn texts(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Count documents by kind: (patents, abstracts, training-only).
    pub fn kind_counts(&self) -> (usize, usize, usize) {
        self.documents
            .iter()
            .fold((0, 0, 0), |(p, a, t), doc| match doc.kind {
                DocumentKind::Patent { .. } => (p + 1, a, t),
                DocumentKind::Abstract => (p, a + 1, t),
                DocumentKind::TrainingOnly => (p, a, t + 1),
            })
    }
}

/// Decode file bytes as UTF-8, falling back to ISO-8859-1.
///
/// Every byte is a valid Latin-1 code point, so decoding cannot fail.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Split text into lines on `\r\n`, `\r`, or `\n`, without terminators.
///
/// A trailing terminator does not start an extra empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}
