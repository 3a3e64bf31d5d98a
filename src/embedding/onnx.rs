// Sentence embeddings from a local all-MiniLM-L6-v2 ONNX model.
//
// An alternative to TF-IDF vectors: each document is tokenized, truncated to
// the model's working window, run through the BERT encoder, and mean-pooled
// over its attention mask into a 384-dimensional vector. The model is
// pretrained, so "training" here is batched inference over the corpus.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

use super::store::VectorStore;
use super::traits::EmbeddingProvider;
use crate::corpus::Corpus;

/// Embedding dimension for all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Token window per document. Longer patents are truncated.
pub const MAX_SEQUENCE_LENGTH: usize = 256;

/// Provider name recorded in saved stores.
pub const ONNX_EMBEDDER_NAME: &str = "onnx-minilm";

/// Model directory name under the configured model dir.
pub const MODEL_NAME: &str = "all-MiniLM-L6-v2";

/// Files `SentenceEmbedder::load` expects inside the model directory.
pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Documents per inference batch.
const DEFAULT_BATCH_SIZE: usize = 32;

/// Sentence embedder using a local ONNX model.
///
/// `Session::run` needs exclusive access, so the session sits behind a
/// Mutex to keep `embed_batch` callable through `&self`.
pub struct SentenceEmbedder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    batch_size: usize,
}

impl SentenceEmbedder {
    /// Load the sentence embedding model and tokenizer from the given directory.
    ///
    /// Expects `model.onnx` and `tokenizer.json` in the directory.
    /// Run `abstract2vec download-model` first if they don't exist.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join(MODEL_FILE);
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);

        if !model_path.exists() {
            anyhow::bail!(
                "Embedding model not found: {}\nRun `abstract2vec download-model` to download it.",
                model_path.display()
            );
        }
        if !tokenizer_path.exists() {
            anyhow::bail!(
                "Embedding tokenizer not found: {}\nRun `abstract2vec download-model` to download it.",
                tokenizer_path.display()
            );
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| {
                format!(
                    "Failed to load embedding model from {}",
                    model_path.display()
                )
            })?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load embedding tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure tokenizer truncation: {}", e))?;

        debug!(
            "Loaded sentence embedding model from {}",
            model_dir.display()
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Override the number of documents per inference batch.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Embed a batch of texts into 384-dimensional vectors.
    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f64>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings: Vec<_> = texts
            .iter()
            .map(|t| {
                self.tokenizer
                    .encode(*t, true)
                    .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
            })
            .collect::<Result<Vec<_>>>()?;

        let batch_size = encodings.len();
        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        if max_len == 0 {
            return Ok(vec![vec![0.0; EMBEDDING_DIM]; batch_size]);
        }

        // BERT inputs: token ids and attention mask padded with 0,
        // token_type_ids all zero for single-segment input.
        let mut input_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
        let mut attention_mask_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
        let mut token_type_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);

        for enc in &encodings {
            let ids = enc.get_ids();
            let mask = enc.get_attention_mask();
            let pad_len = max_len - ids.len();

            input_ids_flat.extend(ids.iter().map(|&id| id as i64));
            input_ids_flat.extend(std::iter::repeat_n(0i64, pad_len));
            attention_mask_flat.extend(mask.iter().map(|&m| m as i64));
            attention_mask_flat.extend(std::iter::repeat_n(0i64, pad_len));
            token_type_ids_flat.extend(std::iter::repeat_n(0i64, max_len));
        }

        let shape = [batch_size as i64, max_len as i64];

        let input_ids_tensor = Tensor::from_array((shape, input_ids_flat))
            .context("Failed to create input_ids tensor")?;
        let attention_mask_tensor = Tensor::from_array((shape, attention_mask_flat.clone()))
            .context("Failed to create attention_mask tensor")?;
        let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids_flat))
            .context("Failed to create token_type_ids tensor")?;

        // Output 0 is last_hidden_state: [batch, seq_len, 384]
        let hidden_states = {
            let mut session = self
                .session
                .lock()
                .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

            let outputs = session
                .run(ort::inputs! {
                    "input_ids" => input_ids_tensor,
                    "attention_mask" => attention_mask_tensor,
                    "token_type_ids" => token_type_ids_tensor
                })
                .context("Embedding ONNX inference failed")?;

            let (_shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .context("Failed to extract embedding output tensor")?;

            data.to_vec()
        };

        Ok(mean_pool(
            &hidden_states,
            &attention_mask_flat,
            batch_size,
            max_len,
        ))
    }
}

impl EmbeddingProvider for SentenceEmbedder {
    fn name(&self) -> &str {
        ONNX_EMBEDDER_NAME
    }

    fn train(&self, corpus: &Corpus) -> Result<VectorStore> {
        if corpus.is_empty() {
            anyhow::bail!("Corpus is empty — nothing to embed");
        }

        let texts = corpus.texts();
        let pb = ProgressBar::new(texts.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("    [{bar:40.cyan/blue}] {pos}/{len} documents ({eta})")
                .expect("valid template")
                .progress_chars("=> "),
        );

        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            vectors.extend(self.embed_batch(chunk)?);
            pb.inc(chunk.len() as u64);
        }
        pb.finish_and_clear();

        info!(
            documents = vectors.len(),
            dim = EMBEDDING_DIM,
            "Computed sentence embeddings"
        );

        let labels = corpus.labels().into_iter().map(str::to_string).collect();
        VectorStore::new(ONNX_EMBEDDER_NAME, EMBEDDING_DIM, labels, vectors)
    }
}

/// Average token embeddings per row, weighted by the attention mask.
///
/// `hidden_states` is the flattened [batch, seq_len, EMBEDDING_DIM] output.
/// Rows with an all-zero mask come back as zero vectors.
pub fn mean_pool(
    hidden_states: &[f32],
    attention_mask: &[i64],
    batch_size: usize,
    seq_len: usize,
) -> Vec<Vec<f64>> {
    let mut embeddings = Vec::with_capacity(batch_size);

    for i in 0..batch_size {
        let mut sum = vec![0.0_f64; EMBEDDING_DIM];
        let mut mask_sum = 0.0_f64;

        for j in 0..seq_len {
            let mask_val = attention_mask[i * seq_len + j] as f64;
            if mask_val > 0.0 {
                mask_sum += mask_val;
                let offset = (i * seq_len + j) * EMBEDDING_DIM;
                for (k, value) in sum.iter_mut().enumerate() {
                    *value += hidden_states[offset + k] as f64 * mask_val;
                }
            }
        }

        if mask_sum > 0.0 {
            for value in &mut sum {
                *value /= mask_sum;
            }
        }

        embeddings.push(sum);
    }

    embeddings
}
