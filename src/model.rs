//! Local cache of ggml whisper models.

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::config::ModelSize;

const MODEL_REPO_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

pub fn model_url(size: ModelSize) -> String {
    format!("{}/{}", MODEL_REPO_URL, size.file_name())
}

pub fn model_path(cache_dir: &Path, size: ModelSize) -> PathBuf {
    cache_dir.join(size.file_name())
}

/// Returns the cached model for `size`, downloading it first if missing.
pub async fn ensure_model(cache_dir: &Path, size: ModelSize) -> Result<PathBuf> {
    let path = model_path(cache_dir, size);
    if path.exists() {
        log::debug!("using cached model {:?}", path);
        return Ok(path);
    }

    std::fs::create_dir_all(cache_dir)
        .with_context(|| format!("Failed to create model cache {:?}", cache_dir))?;

    println!("Downloading {} model...", size);
    download(&model_url(size), &path).await?;
    Ok(path)
}

async fn download(url: &str, dest: &Path) -> Result<()> {
    let mut response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to request {}", url))?;

    if !response.status().is_success() {
        bail!("Download of {} failed: {}", url, response.status());
    }

    let pb = match response.content_length() {
        Some(total) => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")?
                    .progress_chars("#>-"),
            );
            pb
        }
        None => ProgressBar::new_spinner(),
    };

    // A partial download never lands under the final name.
    let dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir)?;

    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk)?;
        pb.inc(chunk.len() as u64);
    }
    file.flush()?;

    file.persist(dest)
        .with_context(|| format!("Failed to store model at {:?}", dest))?;
    pb.finish_with_message("Download complete");
    log::info!("saved model to {:?}", dest);

    Ok(())
}
