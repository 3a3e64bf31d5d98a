// Label classification: decides once, at load time, what a document is.
//
// Labels are file names ("98_US20050142162.txt", "98_smith2004.txt") or
// synthetic database labels ("mimic7"). A file name containing "US" is a
// patent; its patent number is the label with the "_US....txt" tail removed.
// Abstracts belong to the patent whose number prefixes their label.

use std::sync::OnceLock;

use regex_lite::Regex;

/// Substring that marks a label as a patent document.
pub const PATENT_MARKER: &str = "US";

/// Prefix of labels synthesized for database rows.
pub const DATABASE_LABEL_PREFIX: &str = "mimic";

/// The role a document plays in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    /// A patent; `number` is the key its abstracts are matched on.
    Patent { number: String },
    /// An abstract; paired with any patent whose number prefixes its label.
    Abstract,
    /// Contributes to training but never appears in comparisons.
    TrainingOnly,
}

impl DocumentKind {
    /// Classify a label.
    ///
    /// Patents are checked first, then the database prefix; everything else
    /// is an abstract.
    pub fn from_label(label: &str) -> Self {
        if is_patent_label(label) {
            DocumentKind::Patent {
                number: patent_number(label),
            }
        } else if label.starts_with(DATABASE_LABEL_PREFIX) {
            DocumentKind::TrainingOnly
        } else {
            DocumentKind::Abstract
        }
    }

    pub fn is_patent(&self) -> bool {
        matches!(self, DocumentKind::Patent { .. })
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self, DocumentKind::Abstract)
    }
}

/// True when a file name marks a patent document (case-sensitive).
pub fn is_patent_label(label: &str) -> bool {
    label.contains(PATENT_MARKER)
}

/// Build the synthetic label for a database row.
pub fn database_label(index: i64) -> String {
    format!("{DATABASE_LABEL_PREFIX}{index}")
}

fn patent_suffix() -> &'static Regex {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    SUFFIX.get_or_init(|| Regex::new(r"_US.*\.txt").expect("valid patent suffix pattern"))
}

/// Derive the patent number from a patent label.
///
/// Removes the first `_US<...>.txt` match ("98_US20050142162.txt" -> "98").
/// Labels without the suffix are returned unchanged.
pub fn patent_number(label: &str) -> String {
    patent_suffix().replace(label, "").into_owned()
}

/// True when an abstract label belongs to the given patent number.
pub fn abstract_belongs_to(abstract_label: &str, patent_number: &str) -> bool {
    abstract_label
        .strip_prefix(patent_number)
        .is_some_and(|rest| rest.starts_with('_'))
}
