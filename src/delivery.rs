use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assembler::MeditationAudio;
use crate::error::PipelineError;

/// Catalog record associating a delivered file with where it ended up.
#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub file_name: String,
    pub location: String,
    pub duration_seconds: f64,
}

/// Consumes a finished audio blob. A sink failure never invalidates the
/// computed audio; the caller may retry delivery without regenerating.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Delivers the audio under `name` and returns its final location.
    async fn deliver(&self, name: &str, audio: &MeditationAudio)
        -> Result<String, PipelineError>;
}

/// Writes the WAV next to a JSON catalog file.
pub struct LocalFileSink {
    out_dir: PathBuf,
    catalog_path: PathBuf,
}

impl LocalFileSink {
    pub fn new(out_dir: PathBuf) -> Self {
        let catalog_path = out_dir.join("catalog.json");
        Self {
            out_dir,
            catalog_path,
        }
    }
}

#[async_trait]
impl DeliverySink for LocalFileSink {
    async fn deliver(
        &self,
        name: &str,
        audio: &MeditationAudio,
    ) -> Result<String, PipelineError> {
        fs::create_dir_all(&self.out_dir)
            .map_err(|e| PipelineError::Delivery(e.to_string()))?;
        let path = self.out_dir.join(name);
        fs::write(&path, &audio.wav).map_err(|e| PipelineError::Delivery(e.to_string()))?;

        let location = path.to_string_lossy().into_owned();
        append_record(
            &self.catalog_path,
            CatalogRecord {
                file_name: name.to_string(),
                location: location.clone(),
                duration_seconds: audio.duration_seconds,
            },
        )
        .map_err(|e| PipelineError::Delivery(e.to_string()))?;

        info!("wrote {} ({})", location, audio.duration_display());
        Ok(location)
    }
}

/// Uploads the WAV to a remote object store with a plain PUT and records the
/// resulting URL in the local catalog.
pub struct HttpStorageSink {
    client: reqwest::Client,
    base_url: String,
    catalog_path: PathBuf,
}

impl HttpStorageSink {
    pub fn new(base_url: String, catalog_path: PathBuf) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            catalog_path,
        }
    }
}

#[async_trait]
impl DeliverySink for HttpStorageSink {
    async fn deliver(
        &self,
        name: &str,
        audio: &MeditationAudio,
    ) -> Result<String, PipelineError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), name);
        let response = self
            .client
            .put(&url)
            .header("Content-Type", "audio/wav")
            .body(audio.wav.clone())
            .send()
            .await
            .map_err(|e| PipelineError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Delivery(format!(
                "upload to {} returned {}: {}",
                url, status, body
            )));
        }

        append_record(
            &self.catalog_path,
            CatalogRecord {
                file_name: name.to_string(),
                location: url.clone(),
                duration_seconds: audio.duration_seconds,
            },
        )
        .map_err(|e| PipelineError::Delivery(e.to_string()))?;

        info!("uploaded {} ({})", url, audio.duration_display());
        Ok(url)
    }
}

fn load_catalog(path: &Path) -> anyhow::Result<Vec<CatalogRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(path)?;
    let records = serde_json::from_str(&data)?;
    Ok(records)
}

fn append_record(path: &Path, record: CatalogRecord) -> anyhow::Result<()> {
    let mut records = load_catalog(path)?;
    records.push(record);
    let data = serde_json::to_string_pretty(&records)?;
    fs::write(path, data)?;
    Ok(())
}
