// Corpus loader: reads patents and abstracts from disk, appends database rows.
//
// Abstract files follow a fixed header layout: line 0 holds the authors,
// line 3 the title, and the abstract body starts at line 4. Only the body is
// trained on. Per-document failures are logged and the document is skipped;
// they never abort the load.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::database::DatabaseRow;
use super::label::{self, DocumentKind};
use super::{decode_text, split_lines, Corpus, Document, SkipReason, SkippedDocument};
use crate::text::normalizer::NULL_MARKER;
use crate::text::TextNormalizer;

/// Abstract files shorter than this are malformed.
pub const MIN_ABSTRACT_LINES: usize = 9;

/// First line of the abstract body; earlier lines are header metadata.
pub const ABSTRACT_BODY_START: usize = 4;

/// List the `.txt` files directly inside `dir`, sorted by file name.
pub fn list_text_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry =
            entry.with_context(|| format!("Failed to list corpus directory {}", dir.display()))?;
        let is_txt = entry.path().extension().is_some_and(|ext| ext == "txt");
        if entry.file_type().is_file() && is_txt {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Load every document from `dir`, then append `db_rows`.
///
/// File documents come first in file-name order, followed by database rows
/// in the order given.
pub fn load_corpus(
    dir: &Path,
    db_rows: &[DatabaseRow],
    normalizer: &TextNormalizer,
) -> Result<Corpus> {
    let files = list_text_files(dir)?;
    info!(
        dir = %dir.display(),
        files = files.len(),
        "Reading through patents and abstracts"
    );

    let mut corpus = Corpus::default();

    for path in &files {
        let file_label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let loaded = if label::is_patent_label(&file_label) {
            load_patent(path, normalizer)
        } else {
            load_abstract(path, normalizer)
        };

        match loaded {
            Ok(text) => corpus.documents.push(Document {
                kind: DocumentKind::from_label(&file_label),
                label: file_label,
                text,
            }),
            Err(reason) => {
                match &reason {
                    SkipReason::NullContent => {
                        debug!(label = %file_label, "Skipping null-text abstract")
                    }
                    other => warn!(label = %file_label, reason = %other, "Skipping document"),
                }
                corpus.skipped.push(SkippedDocument {
                    label: file_label,
                    reason,
                });
            }
        }
    }

    let file_docs = corpus.documents.len();
    info!(
        kept = file_docs,
        skipped = corpus.skipped.len(),
        "Done reading through patents and abstracts"
    );

    append_database_rows(&mut corpus, db_rows, normalizer);

    info!(
        database_docs = corpus.documents.len() - file_docs,
        total = corpus.documents.len(),
        "Corpus loaded"
    );

    Ok(corpus)
}

/// Append database rows as training-only documents.
///
/// Rows are kept even when their cleaned text is empty. A NULL text column
/// is skipped, and so is a row whose label is already taken; the first row
/// with a given index wins.
pub fn append_database_rows(
    corpus: &mut Corpus,
    rows: &[DatabaseRow],
    normalizer: &TextNormalizer,
) {
    let mut taken: HashSet<String> = corpus.documents.iter().map(|d| d.label.clone()).collect();

    for row in rows {
        let label = label::database_label(row.index);
        if taken.contains(&label) {
            warn!(label = %label, "Skipping database row with duplicate index");
            corpus.skipped.push(SkippedDocument {
                label,
                reason: SkipReason::DuplicateLabel,
            });
            continue;
        }

        match &row.text {
            Some(text) => {
                taken.insert(label.clone());
                corpus.documents.push(Document {
                    label,
                    kind: DocumentKind::TrainingOnly,
                    text: normalizer.normalize(text.trim_end()),
                });
            }
            None => {
                warn!(label = %label, "Skipping database row with NULL text");
                corpus.skipped.push(SkippedDocument {
                    label,
                    reason: SkipReason::MissingText,
                });
            }
        }
    }
}

fn read_text(path: &Path) -> Result<String, SkipReason> {
    std::fs::read(path)
        .map(|bytes| decode_text(&bytes))
        .map_err(|e| SkipReason::Unreadable(e.to_string()))
}

/// Read a patent: the whole file is the document.
fn load_patent(path: &Path, normalizer: &TextNormalizer) -> Result<String, SkipReason> {
    let raw = read_text(path)?;
    Ok(normalizer.normalize(raw.trim_end()))
}

/// Read an abstract body, skipping the author/title header.
fn load_abstract(path: &Path, normalizer: &TextNormalizer) -> Result<String, SkipReason> {
    let raw = read_text(path)?;
    clean_abstract(&raw, normalizer)
}

/// Extract and normalize the body of an abstract file's contents.
pub fn clean_abstract(raw: &str, normalizer: &TextNormalizer) -> Result<String, SkipReason> {
    let lines = split_lines(raw);
    if lines.len() < MIN_ABSTRACT_LINES {
        return Err(SkipReason::MalformedDocument { lines: lines.len() });
    }

    let body = lines[ABSTRACT_BODY_START..].join(" ");
    let cleaned = normalizer.normalize(body.trim_end());

    if cleaned.is_empty() || cleaned.starts_with(NULL_MARKER) {
        return Err(SkipReason::NullContent);
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::from_stopwords(["the", "a", "of", "abstract"]).unwrap()
    }

    fn abstract_file(body: &str) -> String {
        format!("Smith J, Doe A\n\nJournal 2004\nA Study of Wafers\n{body}\n\n\n\n\n")
    }

    #[test]
    fn test_clean_abstract_skips_header() {
        let raw = abstract_file("Silicon wafer etching");
        let cleaned = clean_abstract(&raw, &normalizer()).unwrap();
        assert_eq!(cleaned, "silicon wafer etching");
    }

    #[test]
    fn test_clean_abstract_carriage_return_lines() {
        let raw = "Doe A\rx\ry\rTitle\rsilicon wafer etching\rb\rc\rd\re\r";
        assert_eq!(
            clean_abstract(raw, &normalizer()).unwrap(),
            "silicon wafer etching b c d e"
        );
    }

    #[test]
    fn test_clean_abstract_too_short() {
        let raw = "author\n\n\ntitle\nbody\n";
        assert_eq!(
            clean_abstract(raw, &normalizer()),
            Err(SkipReason::MalformedDocument { lines: 5 })
        );
    }

    #[test]
    fn test_clean_abstract_null_text() {
        let raw = abstract_file("Null Text");
        assert_eq!(clean_abstract(&raw, &normalizer()), Err(SkipReason::NullContent));
    }

    #[test]
    fn test_clean_abstract_null_prefix_token() {
        let raw = abstract_file("nullification of claims");
        assert_eq!(clean_abstract(&raw, &normalizer()), Err(SkipReason::NullContent));
    }

    #[test]
    fn test_clean_abstract_empty_body() {
        let raw = abstract_file("The Abstract");
        assert_eq!(clean_abstract(&raw, &normalizer()), Err(SkipReason::NullContent));
    }

    #[test]
    fn test_list_text_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "x").unwrap();
        std::fs::write(dir.path().join("a.txt"), "x").unwrap();
        std::fs::write(dir.path().join("notes.md"), "x").unwrap();
        std::fs::create_dir(dir.path().join("sub.txt")).unwrap();

        let files = list_text_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_database_rows_follow_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1_US42.txt"), "Lithium battery cathode\n\n").unwrap();

        let rows = vec![
            DatabaseRow {
                index: 7,
                text: Some("Chest pain  \n".to_string()),
            },
            DatabaseRow {
                index: 8,
                text: None,
            },
        ];
        let corpus = load_corpus(dir.path(), &rows, &normalizer()).unwrap();

        assert_eq!(corpus.labels(), vec!["1_US42.txt", "mimic7"]);
        assert_eq!(corpus.texts(), vec!["lithium battery cathode", "chest pain"]);
        assert_eq!(corpus.documents[1].kind, DocumentKind::TrainingOnly);
        assert_eq!(corpus.skipped.len(), 1);
        assert_eq!(corpus.skipped[0].reason, SkipReason::MissingText);
    }

    #[test]
    fn test_duplicate_database_index_keeps_first_row() {
        let mut corpus = Corpus::default();
        let rows = vec![
            DatabaseRow {
                index: 7,
                text: Some("wafer".to_string()),
            },
            DatabaseRow {
                index: 7,
                text: Some("etch".to_string()),
            },
            DatabaseRow {
                index: 9,
                text: Some("anode".to_string()),
            },
        ];
        append_database_rows(&mut corpus, &rows, &normalizer());

        assert_eq!(corpus.labels(), vec!["mimic7", "mimic9"]);
        assert_eq!(corpus.texts(), vec!["wafer", "anode"]);
        assert_eq!(corpus.skipped.len(), 1);
        assert_eq!(corpus.skipped[0].label, "mimic7");
        assert_eq!(corpus.skipped[0].reason, SkipReason::DuplicateLabel);
    }

    #[test]
    fn test_database_row_null_marker_is_kept() {
        let mut corpus = Corpus::default();
        let rows = vec![DatabaseRow {
            index: 1,
            text: Some("null".to_string()),
        }];
        append_database_rows(&mut corpus, &rows, &normalizer());
        assert_eq!(corpus.labels(), vec!["mimic1"]);
        assert_eq!(corpus.texts(), vec!["null"]);
    }
}
