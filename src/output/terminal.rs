// Colored terminal output for training summaries and match tables.

use colored::Colorize;

use crate::corpus::{Corpus, SkipReason};
use crate::embedding::VectorStore;
use crate::scoring::pairing::top_matches;
use crate::scoring::SimilarityRecord;

/// Summarize what the loader kept and dropped.
pub fn display_corpus_summary(corpus: &Corpus) {
    let (patents, abstracts, training_only) = corpus.kind_counts();

    println!("\n{}", "=== Corpus ===".bold());
    println!("  Patents:        {patents}");
    println!("  Abstracts:      {abstracts}");
    println!("  Database rows:  {training_only}");

    if corpus.skipped.is_empty() {
        return;
    }

    let null_count = corpus
        .skipped
        .iter()
        .filter(|s| s.reason == SkipReason::NullContent)
        .count();
    let other: Vec<_> = corpus
        .skipped
        .iter()
        .filter(|s| s.reason != SkipReason::NullContent)
        .collect();

    println!(
        "  Skipped:        {} ({} null text)",
        corpus.skipped.len(),
        null_count
    );
    for skipped in other.iter().take(10) {
        println!(
            "    {} {}",
            skipped.label.yellow(),
            format!("({})", skipped.reason).dimmed()
        );
    }
    if other.len() > 10 {
        println!("    {}", format!("... and {} more", other.len() - 10).dimmed());
    }
}

/// Summarize a trained or loaded vector store.
pub fn display_store_summary(store: &VectorStore) {
    println!(
        "  Vectors: {} documents x {} dimensions ({}, trained {})",
        store.len(),
        store.dimensions(),
        store.embedder(),
        store.trained_at().format("%Y-%m-%d %H:%M UTC")
    );
}

/// Display the highest-scoring pairs.
pub fn display_top_matches(records: &[SimilarityRecord], n: usize) {
    if records.is_empty() {
        println!("No patent/abstract pairs found. Abstract labels must start with <patent number>_.");
        return;
    }

    let top = top_matches(records, n);

    println!(
        "\n{}",
        format!("=== Top {} of {} pairs ===", top.len(), records.len()).bold()
    );
    println!();
    println!(
        "  {:>4}  {:<30} {:<30} {:>8}  {}",
        "Rank".dimmed(),
        "Patent".dimmed(),
        "Abstract".dimmed(),
        "Similar".dimmed(),
        "Title".dimmed(),
    );
    println!("  {}", "-".repeat(90).dimmed());

    for (i, record) in top.iter().enumerate() {
        let pct = format!("{:.1}%", record.similarity * 100.0);
        println!(
            "  {:>4}. {:<30} {:<30} {:>8}  {}",
            i + 1,
            super::truncate_chars(&record.patent_label, 30),
            super::truncate_chars(&record.abstract_label, 30),
            colorize_similarity(record.similarity, &pct),
            super::truncate_chars(&record.abstract_title, 50).dimmed(),
        );
    }
    println!();
}

fn colorize_similarity(similarity: f64, text: &str) -> colored::ColoredString {
    if similarity >= 0.75 {
        text.bright_green()
    } else if similarity >= 0.5 {
        text.bright_yellow()
    } else {
        text.normal()
    }
}
