// Unit tests for text normalization, label classification, and the loader.
//
// Pure functions only, except the loader tests which build a throwaway
// corpus directory with tempfile.

use std::fs;

use abstract2vec::corpus::database::DatabaseRow;
use abstract2vec::corpus::label::{abstract_belongs_to, patent_number, DocumentKind};
use abstract2vec::corpus::loader::{clean_abstract, load_corpus};
use abstract2vec::corpus::{decode_text, split_lines, SkipReason};
use abstract2vec::embedding::tfidf::TfIdfEmbedder;
use abstract2vec::embedding::EmbeddingProvider;
use abstract2vec::text::TextNormalizer;

fn normalizer() -> TextNormalizer {
    TextNormalizer::from_stopwords(["the", "a", "an", "of", "and", "for", "abstract"]).unwrap()
}

fn abstract_file(title: &str, body: &str) -> String {
    format!("Doe A, Roe B\nDept of Chemistry\nJ Appl Phys 2004\n{title}\n{body}\n\n\n\n\n")
}

// ============================================================
// TextNormalizer
// ============================================================

#[test]
fn normalize_output_is_lowercase_single_spaced() {
    let out = normalizer().normalize("  Lithium-Ion\tBATTERY\n\nCathode  ");
    assert_eq!(out, "lithium ion battery cathode");
}

#[test]
fn normalize_never_emits_stopwords() {
    let n = normalizer();
    let out = n.normalize("The coating of an anode and the cathode for a cell");
    for token in out.split(' ') {
        assert!(!n.is_stopword(token), "stopword {token:?} survived");
    }
    assert_eq!(out, "coating anode cathode cell");
}

#[test]
fn normalize_is_idempotent() {
    let n = normalizer();
    let once = n.normalize("An Improved Method of Wafer Bonding, and Etching!");
    assert_eq!(n.normalize(&once), once);
}

#[test]
fn english_list_drops_common_words() {
    let n = TextNormalizer::english(&["abstract".to_string()]).unwrap();
    assert_eq!(n.normalize("The Abstract"), "");
    assert!(n.normalize("lithium battery").contains("lithium"));
}

#[test]
fn english_list_keeps_null_marker() {
    let n = TextNormalizer::english(&[]).unwrap();
    assert!(n.normalize("Null Text").starts_with("null"));
}

// ============================================================
// Labels
// ============================================================

#[test]
fn classify_patent_abstract_and_database_labels() {
    assert_eq!(
        DocumentKind::from_label("98_US20050142162.txt"),
        DocumentKind::Patent {
            number: "98".to_string()
        }
    );
    assert_eq!(DocumentKind::from_label("98_smith.txt"), DocumentKind::Abstract);
    assert_eq!(DocumentKind::from_label("mimic7"), DocumentKind::TrainingOnly);
}

#[test]
fn patent_marker_wins_over_database_prefix() {
    assert!(DocumentKind::from_label("mimic_US1.txt").is_patent());
}

#[test]
fn patent_number_applied_twice_is_stable() {
    let once = patent_number("98_US20050142162.txt");
    assert_eq!(patent_number(&once), once);
}

#[test]
fn abstract_prefix_requires_separator() {
    assert!(abstract_belongs_to("12_abs1.txt", "12"));
    assert!(!abstract_belongs_to("123_abs1.txt", "12"));
    assert!(!abstract_belongs_to("12abs.txt", "12"));
}

// ============================================================
// Abstract cleaning
// ============================================================

#[test]
fn abstract_header_lines_are_not_trained_on() {
    let raw = abstract_file("Wafer Bonding Review", "Silicon wafer etching");
    let cleaned = clean_abstract(&raw, &normalizer()).unwrap();
    assert_eq!(cleaned, "silicon wafer etching");
    assert!(!cleaned.contains("doe"));
    assert!(!cleaned.contains("review"));
}

#[test]
fn abstract_with_eight_lines_is_malformed() {
    let raw = "a\nb\nc\nd\ne\nf\ng\nh\n";
    assert_eq!(
        clean_abstract(raw, &normalizer()),
        Err(SkipReason::MalformedDocument { lines: 8 })
    );
}

#[test]
fn abstract_with_nine_lines_is_accepted() {
    let raw = "a\nb\nc\nd\nbody text\nf\ng\nh\ni\n";
    assert_eq!(clean_abstract(raw, &normalizer()).unwrap(), "body text f g h i");
}

#[test]
fn carriage_return_abstract_is_accepted() {
    let raw = "Doe A\rx\ry\rTitle\rsilicon wafer etching\rb\rc\rd\re\r";
    assert_eq!(split_lines(raw).len(), 9);
    assert_eq!(
        clean_abstract(raw, &normalizer()).unwrap(),
        "silicon wafer etching b c d e"
    );
}

#[test]
fn latin1_bytes_decode() {
    let bytes = b"caf\xe9 cr\xe8me";
    assert_eq!(decode_text(bytes), "café crème");
}

// ============================================================
// Loader
// ============================================================

#[test]
fn loader_keeps_file_order_and_skips_bad_abstracts() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("2_US77.txt"), "Enzyme catalysis\n").unwrap();
    fs::write(
        dir.path().join("2_good.txt"),
        abstract_file("Enzymes", "Enzyme hydrolysis"),
    )
    .unwrap();
    fs::write(dir.path().join("2_null.txt"), abstract_file("Empty", "Null Text")).unwrap();
    fs::write(dir.path().join("2_short.txt"), "a\nb\nc\n").unwrap();
    fs::write(dir.path().join("readme.md"), "not a document").unwrap();

    let corpus = load_corpus(dir.path(), &[], &normalizer()).unwrap();

    assert_eq!(corpus.labels(), vec!["2_US77.txt", "2_good.txt"]);
    assert_eq!(corpus.texts(), vec!["enzyme catalysis", "enzyme hydrolysis"]);
    assert_eq!(corpus.kind_counts(), (1, 1, 0));

    let skipped: Vec<(&str, &SkipReason)> = corpus
        .skipped
        .iter()
        .map(|s| (s.label.as_str(), &s.reason))
        .collect();
    assert_eq!(
        skipped,
        vec![
            ("2_null.txt", &SkipReason::NullContent),
            ("2_short.txt", &SkipReason::MalformedDocument { lines: 3 }),
        ]
    );
}

#[test]
fn loader_appends_database_rows_last() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("5_US1.txt"), "Wafer\n").unwrap();
    let rows = vec![
        DatabaseRow {
            index: 3,
            text: Some("Patient with chest pain".to_string()),
        },
        DatabaseRow {
            index: 1,
            text: Some("Wafer".to_string()),
        },
    ];

    let corpus = load_corpus(dir.path(), &rows, &normalizer()).unwrap();

    assert_eq!(corpus.labels(), vec!["5_US1.txt", "mimic3", "mimic1"]);
    assert_eq!(corpus.kind_counts(), (1, 0, 2));
}

#[test]
fn duplicate_database_index_does_not_abort_training() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("1_US1.txt"), "Wafer etch\n").unwrap();
    let rows = vec![
        DatabaseRow {
            index: 7,
            text: Some("wafer".to_string()),
        },
        DatabaseRow {
            index: 7,
            text: Some("etch".to_string()),
        },
    ];

    let corpus = load_corpus(dir.path(), &rows, &normalizer()).unwrap();
    assert_eq!(corpus.labels(), vec!["1_US1.txt", "mimic7"]);
    assert_eq!(corpus.skipped[0].reason, SkipReason::DuplicateLabel);

    let embedder = TfIdfEmbedder {
        dimensions: 10,
        min_count: 1,
    };
    let store = embedder.train(&corpus).unwrap();
    assert_eq!(store.len(), 2);
}

#[test]
fn loader_missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(load_corpus(&missing, &[], &normalizer()).is_err());
}
