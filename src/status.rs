// System status display: corpus files, database, saved vectors, model files.

use anyhow::Result;

use crate::config::{Config, EmbedderBackend};
use crate::corpus::label::is_patent_label;
use crate::corpus::loader::list_text_files;
use crate::embedding::download::embedding_files_present;
use crate::embedding::VectorStore;

/// Display system status to the terminal.
pub fn show(config: &Config) -> Result<()> {
    if config.corpus_dir.is_dir() {
        let files = list_text_files(&config.corpus_dir)?;
        let patents = files
            .iter()
            .filter(|p| {
                p.file_name()
                    .is_some_and(|n| is_patent_label(&n.to_string_lossy()))
            })
            .count();
        println!(
            "Corpus: {} ({} patent files, {} other .txt files)",
            config.corpus_dir.display(),
            patents,
            files.len() - patents
        );
    } else {
        println!("Corpus: {} (not found)", config.corpus_dir.display());
    }

    match &config.db_path {
        Some(path) if path.exists() => {
            let size = std::fs::metadata(path)
                .map(|m| format_bytes(m.len()))
                .unwrap_or_else(|_| "unknown".to_string());
            println!(
                "Database: {} ({}), table {}",
                path.display(),
                size,
                config.db_table
            );
        }
        Some(path) => println!("Database: {} (not found)", path.display()),
        None => println!("Database: disabled"),
    }

    if config.vectors_path.exists() {
        match VectorStore::load(&config.vectors_path) {
            Ok(store) => println!(
                "Vectors: {} documents x {} dimensions ({}, trained {})",
                store.len(),
                store.dimensions(),
                store.embedder(),
                store.trained_at().format("%Y-%m-%d %H:%M UTC")
            ),
            Err(e) => println!("Vectors: {} (unreadable: {e})", config.vectors_path.display()),
        }
    } else {
        println!("Vectors: not trained yet");
        println!("  Run `abstract2vec train` to build them");
    }

    let embedder = match config.embedder {
        EmbedderBackend::TfIdf => format!(
            "tfidf ({} dimensions, min count {})",
            config.dimensions, config.min_count
        ),
        EmbedderBackend::Onnx => {
            let present = if embedding_files_present(&config.model_dir) {
                "model present"
            } else {
                "model missing — run `abstract2vec download-model`"
            };
            format!("onnx ({present})")
        }
    };
    println!("Embedder: {embedder}");
    println!("Results: {}", config.output_path.display());

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
