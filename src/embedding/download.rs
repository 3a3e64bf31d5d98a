// Fetches the sentence embedding model that `SentenceEmbedder::load` reads.
//
// Files land in `<model_dir>/all-MiniLM-L6-v2/` (by default under the
// platform data dir). Each file is streamed into a `.part` sibling and
// renamed once complete, so an interrupted download is retried next run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::onnx::{MODEL_FILE, MODEL_NAME, TOKENIZER_FILE};

/// Base URL of the model repository on HuggingFace.
const REPO_URL: &str = "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main";

/// A file the embedder needs, and where it lives in the repository.
struct ModelFile {
    local: &'static str,
    remote: &'static str,
    /// Large files get a byte progress bar.
    large: bool,
}

const MODEL_FILES: [ModelFile; 2] = [
    ModelFile {
        local: TOKENIZER_FILE,
        remote: "tokenizer.json",
        large: false,
    },
    ModelFile {
        local: MODEL_FILE,
        remote: "onnx/model.onnx",
        large: true,
    },
];

/// Default base directory for model files.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("abstract2vec")
        .join("models")
}

/// Directory holding the sentence embedding model under `base`.
pub fn embedding_model_dir(base: &Path) -> PathBuf {
    base.join(MODEL_NAME)
}

/// True when every file the embedder loads is present under `base`.
pub fn embedding_files_present(base: &Path) -> bool {
    let dir = embedding_model_dir(base);
    MODEL_FILES.iter().all(|f| dir.join(f.local).exists())
}

/// Download whichever model files are missing under `base`.
pub async fn download_model(base: &Path) -> Result<()> {
    let dir = embedding_model_dir(base);
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create model directory {}", dir.display()))?;

    println!("\nSentence embedding model ({MODEL_NAME}):");

    let client = reqwest::Client::new();
    for file in &MODEL_FILES {
        let dest = dir.join(file.local);
        if dest.exists() {
            info!(file = file.local, "Model file present, skipping");
            println!("  {} (already exists)", file.local);
            continue;
        }

        println!("  Downloading {}...", file.local);
        let url = format!("{REPO_URL}/{}", file.remote);
        fetch(&client, &url, &dest, file.large).await?;
    }

    Ok(())
}

/// Stream `url` into `dest` through a `.part` file.
async fn fetch(client: &reqwest::Client, url: &str, dest: &Path, large: bool) -> Result<()> {
    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {url}"))?;

    if !response.status().is_success() {
        anyhow::bail!("Download of {url} failed with status {}", response.status());
    }

    let progress = if large {
        progress_bar(response.content_length())?
    } else {
        ProgressBar::hidden()
    };

    let partial = dest.with_extension("part");
    let mut out = tokio::fs::File::create(&partial)
        .await
        .with_context(|| format!("Failed to create {}", partial.display()))?;

    let mut written: u64 = 0;
    while let Some(chunk) = response
        .chunk()
        .await
        .with_context(|| format!("Failed to read response body from {url}"))?
    {
        out.write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write {}", partial.display()))?;
        written += chunk.len() as u64;
        progress.set_position(written);
    }
    out.flush()
        .await
        .with_context(|| format!("Failed to flush {}", partial.display()))?;
    drop(out);

    tokio::fs::rename(&partial, dest)
        .await
        .with_context(|| format!("Failed to move download into {}", dest.display()))?;
    progress.finish_and_clear();

    info!(url = url, dest = %dest.display(), bytes = written, "Downloaded model file");
    Ok(())
}

fn progress_bar(total: Option<u64>) -> Result<ProgressBar> {
    let Some(total) = total else {
        return Ok(ProgressBar::new_spinner());
    };
    let style = ProgressStyle::default_bar()
        .template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        .context("Invalid progress bar template")?
        .progress_chars("=> ");
    Ok(ProgressBar::new(total).with_style(style))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_dir_is_under_abstract2vec() {
        let dir = default_model_dir();
        assert!(dir.ends_with("abstract2vec/models"), "got {}", dir.display());
    }

    #[test]
    fn test_model_files_match_loader_expectations() {
        let locals: Vec<&str> = MODEL_FILES.iter().map(|f| f.local).collect();
        assert!(locals.contains(&MODEL_FILE));
        assert!(locals.contains(&TOKENIZER_FILE));
    }

    #[test]
    fn test_embedding_files_present_requires_all_files() {
        let base = tempfile::tempdir().unwrap();
        assert!(!embedding_files_present(base.path()));

        let dir = embedding_model_dir(base.path());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(MODEL_FILE), b"onnx").unwrap();
        assert!(!embedding_files_present(base.path()));

        std::fs::write(dir.join(TOKENIZER_FILE), b"{}").unwrap();
        assert!(embedding_files_present(base.path()));
    }
}
