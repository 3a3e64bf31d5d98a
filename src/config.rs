use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::corpus::database::DEFAULT_TABLE;
use crate::output::results::DEFAULT_RESULTS_FILE;
use crate::text::normalizer::DEFAULT_EXTRA_STOPWORDS;

/// Which embedding provider trains the document vectors.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedderBackend {
    /// Corpus-trained TF-IDF vectors (default): no model download needed
    TfIdf,
    /// Local ONNX sentence embedding model: run `download-model` first
    Onnx,
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// setting has a default, so a bare run works from inside a corpus directory.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the patent and abstract .txt files
    pub corpus_dir: PathBuf,
    /// SQLite database with training-only rows (None disables it)
    pub db_path: Option<PathBuf>,
    /// Table holding the `index` and `TEXT` columns
    pub db_table: String,
    /// Where `train` saves vectors and `compare` loads them
    pub vectors_path: PathBuf,
    /// Results CSV destination
    pub output_path: PathBuf,
    pub embedder: EmbedderBackend,
    /// Directory containing the ONNX model files
    pub model_dir: PathBuf,
    /// TF-IDF vector size
    pub dimensions: usize,
    /// Minimum corpus frequency for a TF-IDF term
    pub min_count: usize,
    /// Words removed in addition to the English stopword list
    pub extra_stopwords: Vec<String>,
    /// Optional file that receives a copy of the log stream
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let embedder = match env::var("ABSTRACT2VEC_EMBEDDER").as_deref() {
            Ok("onnx") => EmbedderBackend::Onnx,
            Ok("tfidf") | Err(_) => EmbedderBackend::TfIdf,
            Ok(other) => anyhow::bail!(
                "Unknown ABSTRACT2VEC_EMBEDDER value {other:?} (expected \"tfidf\" or \"onnx\")"
            ),
        };

        // An explicitly empty DB path turns the database source off
        let db_path = match env::var("ABSTRACT2VEC_DB_PATH") {
            Ok(path) if path.trim().is_empty() => None,
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => Some(PathBuf::from("./mimic.db")),
        };

        let extra_stopwords = match env::var("ABSTRACT2VEC_EXTRA_STOPWORDS") {
            Ok(list) => parse_word_list(&list),
            Err(_) => DEFAULT_EXTRA_STOPWORDS
                .iter()
                .map(|w| w.to_string())
                .collect(),
        };

        Ok(Self {
            corpus_dir: env::var("ABSTRACT2VEC_CORPUS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            db_path,
            db_table: env::var("ABSTRACT2VEC_DB_TABLE").unwrap_or_else(|_| DEFAULT_TABLE.to_string()),
            vectors_path: env::var("ABSTRACT2VEC_VECTORS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./abstract2vec.vectors.json")),
            output_path: env::var("ABSTRACT2VEC_OUTPUT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_RESULTS_FILE)),
            embedder,
            model_dir: env::var("ABSTRACT2VEC_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| crate::embedding::download::default_model_dir()),
            dimensions: parse_usize_var("ABSTRACT2VEC_DIMENSIONS", 300)?,
            min_count: parse_usize_var("ABSTRACT2VEC_MIN_COUNT", 5)?,
            extra_stopwords,
            log_file: env::var("ABSTRACT2VEC_LOG_FILE").ok().map(PathBuf::from),
        })
    }

    /// Check that the corpus directory exists.
    pub fn require_corpus(&self) -> Result<()> {
        if !self.corpus_dir.is_dir() {
            anyhow::bail!(
                "Corpus directory not found: {}\n\
                 Set ABSTRACT2VEC_CORPUS_DIR to the folder holding the patent and abstract files.",
                self.corpus_dir.display()
            );
        }
        Ok(())
    }

    /// Validate that the chosen embedder has what it needs.
    /// For ONNX: model files must exist (or user should run download-model).
    pub fn require_embedder(&self) -> Result<()> {
        match self.embedder {
            EmbedderBackend::TfIdf => {
                if self.dimensions == 0 {
                    anyhow::bail!("ABSTRACT2VEC_DIMENSIONS must be greater than zero");
                }
                Ok(())
            }
            EmbedderBackend::Onnx => {
                if !crate::embedding::download::embedding_files_present(&self.model_dir) {
                    anyhow::bail!(
                        "ONNX embedding model not found in {}\n\
                         Run `abstract2vec download-model` to download it.\n\
                         Or set ABSTRACT2VEC_EMBEDDER=tfidf to train TF-IDF vectors instead.",
                        self.model_dir.display()
                    );
                }
                Ok(())
            }
        }
    }
}

fn parse_usize_var(name: &str, default: usize) -> Result<usize> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a non-negative integer, got {value:?}")),
        Err(_) => Ok(default),
    }
}

/// Split a comma-separated word list, dropping empty entries.
pub fn parse_word_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty())
        .collect()
}
