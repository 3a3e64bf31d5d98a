// Unit tests for patent/abstract pairing and similarity scoring.
//
// Vectors and metadata are built in memory; no files are touched.

use std::collections::HashMap;

use abstract2vec::embedding::VectorStore;
use abstract2vec::scoring::metadata::AbstractMetadata;
use abstract2vec::scoring::pairing::top_matches;
use abstract2vec::scoring::similarity::{cosine_similarity, format_percent, parse_percent};
use abstract2vec::scoring::pair_and_score;

fn store(entries: &[(&str, Vec<f64>)]) -> VectorStore {
    let dims = entries.first().map(|(_, v)| v.len()).unwrap_or(0);
    VectorStore::new(
        "test",
        dims,
        entries.iter().map(|(l, _)| l.to_string()).collect(),
        entries.iter().map(|(_, v)| v.clone()).collect(),
    )
    .unwrap()
}

fn metadata(titles: &[(&str, &str)]) -> HashMap<String, AbstractMetadata> {
    titles
        .iter()
        .map(|(label, title)| {
            (
                label.to_string(),
                AbstractMetadata {
                    author: "Doe A".to_string(),
                    title: title.to_string(),
                },
            )
        })
        .collect()
}

// ============================================================
// Similarity
// ============================================================

#[test]
fn cosine_of_identical_vectors_is_exactly_one() {
    let v = vec![0.31, 0.07, 0.92, 0.4];
    assert_eq!(cosine_similarity(&v, &v), 1.0);
}

#[test]
fn cosine_of_opposite_vectors_is_minus_one() {
    assert_eq!(cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]), -1.0);
}

#[test]
fn cosine_of_orthogonal_vectors_is_zero() {
    assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]), 0.0);
}

#[test]
fn cosine_with_zero_vector_is_zero() {
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
}

#[test]
fn percent_rendering() {
    assert_eq!(format_percent(1.0), "100.0%");
    assert_eq!(format_percent(0.5), "50.0%");
    assert_eq!(format_percent(0.0), "0.0%");
}

#[test]
fn tiny_percent_uses_exponent_form() {
    let s = 2f64.powi(-30);
    let percent = format_percent(s);
    assert!(percent.ends_with("e-8%"), "got {percent}");
    assert_eq!(parse_percent(&percent), Some(s));
}

#[test]
fn percent_parses_back() {
    let s = 0.8731;
    let parsed = parse_percent(&format_percent(s)).unwrap();
    assert!((parsed - s).abs() < 1e-12);
    assert_eq!(parse_percent("n/a"), None);
}

// ============================================================
// Pairing
// ============================================================

#[test]
fn identical_patent_and_abstract_score_one_hundred_percent() {
    let vectors = store(&[
        ("12_US999.txt", vec![0.2, 0.4, 0.1]),
        ("12_abs1.txt", vec![0.2, 0.4, 0.1]),
    ]);
    let meta = metadata(&[("12_abs1.txt", "T1")]);

    let records = pair_and_score(vectors.labels(), &vectors, &meta).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].patent_label, "12_US999.txt");
    assert_eq!(records[0].abstract_label, "12_abs1.txt");
    assert_eq!(records[0].percent(), "100.0%");
    assert_eq!(records[0].abstract_title, "T1");
}

#[test]
fn patent_without_abstracts_yields_no_rows() {
    let vectors = store(&[
        ("12_US999.txt", vec![1.0, 0.0]),
        ("34_abs.txt", vec![0.0, 1.0]),
    ]);
    let meta = metadata(&[("34_abs.txt", "Other")]);

    let records = pair_and_score(vectors.labels(), &vectors, &meta).unwrap();
    assert!(records.is_empty());
}

#[test]
fn database_labels_never_pair() {
    let vectors = store(&[
        ("7_US1.txt", vec![1.0, 0.0]),
        ("mimic7", vec![1.0, 0.0]),
        ("7_abs.txt", vec![0.6, 0.8]),
    ]);
    let meta = metadata(&[("7_abs.txt", "Seven")]);

    let records = pair_and_score(vectors.labels(), &vectors, &meta).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].abstract_label, "7_abs.txt");
    assert!((records[0].similarity - 0.6).abs() < 1e-12);
}

#[test]
fn rows_follow_patent_order_then_label_order() {
    let vectors = store(&[
        ("2_b.txt", vec![1.0, 1.0]),
        ("2_US5.txt", vec![1.0, 0.0]),
        ("1_US9.txt", vec![0.0, 1.0]),
        ("2_a.txt", vec![0.0, 1.0]),
        ("1_x.txt", vec![1.0, 0.0]),
    ]);
    let meta = metadata(&[("2_b.txt", "B"), ("2_a.txt", "A"), ("1_x.txt", "X")]);

    let records = pair_and_score(vectors.labels(), &vectors, &meta).unwrap();
    let pairs: Vec<(&str, &str)> = records
        .iter()
        .map(|r| (r.patent_label.as_str(), r.abstract_label.as_str()))
        .collect();

    assert_eq!(
        pairs,
        vec![
            ("1_US9.txt", "1_x.txt"),
            ("2_US5.txt", "2_b.txt"),
            ("2_US5.txt", "2_a.txt"),
        ]
    );
}

#[test]
fn pairing_is_deterministic() {
    let vectors = store(&[
        ("3_US1.txt", vec![0.3, 0.1, 0.9]),
        ("3_a.txt", vec![0.2, 0.8, 0.1]),
        ("3_b.txt", vec![0.5, 0.5, 0.5]),
    ]);
    let meta = metadata(&[("3_a.txt", "A"), ("3_b.txt", "B")]);

    let first = pair_and_score(vectors.labels(), &vectors, &meta).unwrap();
    let second = pair_and_score(vectors.labels(), &vectors, &meta).unwrap();
    assert_eq!(first, second);
}

#[test]
fn missing_metadata_aborts_pairing() {
    let vectors = store(&[
        ("3_US1.txt", vec![1.0, 0.0]),
        ("3_a.txt", vec![1.0, 0.0]),
    ]);
    let meta = metadata(&[]);

    let err = pair_and_score(vectors.labels(), &vectors, &meta).unwrap_err();
    assert!(err.to_string().contains("3_a.txt"));
}

#[test]
fn malformed_abstract_header_is_fatal() {
    let err = AbstractMetadata::parse("3_a.txt", "only\ntwo lines\n").unwrap_err();
    assert!(err.to_string().contains("Malformed abstract 3_a.txt"));
}

#[test]
fn label_without_vector_aborts_pairing() {
    let vectors = store(&[("3_US1.txt", vec![1.0, 0.0])]);
    let meta = metadata(&[("3_a.txt", "A")]);
    let labels = ["3_US1.txt", "3_a.txt"];

    let err = pair_and_score(&labels, &vectors, &meta).unwrap_err();
    assert!(err.to_string().contains("No vector for 3_a.txt"));
}

#[test]
fn top_matches_are_ranked_and_capped() {
    let vectors = store(&[
        ("4_US1.txt", vec![1.0, 0.0]),
        ("4_a.txt", vec![0.0, 1.0]),
        ("4_b.txt", vec![1.0, 0.0]),
        ("4_c.txt", vec![1.0, 1.0]),
    ]);
    let meta = metadata(&[("4_a.txt", "A"), ("4_b.txt", "B"), ("4_c.txt", "C")]);
    let records = pair_and_score(vectors.labels(), &vectors, &meta).unwrap();

    let top = top_matches(&records, 2);
    let labels: Vec<&str> = top.iter().map(|r| r.abstract_label.as_str()).collect();
    assert_eq!(labels, vec!["4_b.txt", "4_c.txt"]);
}
