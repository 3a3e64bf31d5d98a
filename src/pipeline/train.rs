// Training stage: build the corpus and turn it into a saved vector store.

use anyhow::Result;
use tracing::info;

use crate::config::{Config, EmbedderBackend};
use crate::corpus::database::{self, DatabaseRow};
use crate::corpus::loader::load_corpus;
use crate::corpus::Corpus;
use crate::embedding::download::embedding_model_dir;
use crate::embedding::onnx::SentenceEmbedder;
use crate::embedding::tfidf::TfIdfEmbedder;
use crate::embedding::{EmbeddingProvider, VectorStore};
use crate::text::TextNormalizer;

/// What a training run produced.
#[derive(Debug)]
pub struct TrainOutcome {
    pub corpus: Corpus,
    pub store: VectorStore,
}

/// Create the embedding provider selected in the configuration.
pub fn build_provider(config: &Config) -> Result<Box<dyn EmbeddingProvider>> {
    config.require_embedder()?;
    match config.embedder {
        EmbedderBackend::TfIdf => Ok(Box::new(TfIdfEmbedder {
            dimensions: config.dimensions,
            min_count: config.min_count,
        })),
        EmbedderBackend::Onnx => {
            let embedder = SentenceEmbedder::load(&embedding_model_dir(&config.model_dir))?;
            Ok(Box::new(embedder))
        }
    }
}

/// Read the configured database rows, or none when the source is disabled.
pub fn database_rows(config: &Config) -> Result<Vec<DatabaseRow>> {
    match &config.db_path {
        Some(path) => {
            info!(path = %path.display(), table = %config.db_table, "Reading database rows");
            database::load_rows(path, &config.db_table)
        }
        None => {
            info!("Database source disabled");
            Ok(Vec::new())
        }
    }
}

/// Load the full corpus described by the configuration.
pub fn load(config: &Config) -> Result<Corpus> {
    config.require_corpus()?;
    let normalizer = TextNormalizer::english(&config.extra_stopwords)?;
    let rows = database_rows(config)?;
    load_corpus(&config.corpus_dir, &rows, &normalizer)
}

/// Train with an explicit provider and save the resulting store.
pub fn train_with(
    config: &Config,
    corpus: Corpus,
    provider: &dyn EmbeddingProvider,
) -> Result<TrainOutcome> {
    info!(
        embedder = provider.name(),
        documents = corpus.len(),
        "Training document vectors"
    );
    let store = provider.train(&corpus)?;
    store.save(&config.vectors_path)?;
    Ok(TrainOutcome { corpus, store })
}

/// Load the corpus, train the configured provider, and save the vectors.
pub fn run(config: &Config) -> Result<TrainOutcome> {
    let provider = build_provider(config)?;
    let corpus = load(config)?;
    train_with(config, corpus, provider.as_ref())
}
