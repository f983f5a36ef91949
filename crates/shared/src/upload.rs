use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::form::UploadedFile;
use crate::AppConfig;

/// Stores an image and returns its public HTTPS URL.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, image: &UploadedFile, folder: &str) -> Result<String>;
}

/// Cloudinary signed uploads.
pub struct CloudinaryClient {
    client: Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl CloudinaryClient {
    pub fn new(cloud_name: String, api_key: String, api_secret: String) -> Self {
        Self { client: Client::new(), cloud_name, api_key, api_secret }
    }

    pub fn from_config(cfg: &AppConfig) -> Option<Self> {
        Some(Self::new(
            cfg.cloudinary_cloud_name.clone()?,
            cfg.cloudinary_api_key.clone()?,
            cfg.cloudinary_api_secret.clone()?,
        ))
    }
}

/// SHA-256 over the `&`-joined sorted params followed by the secret.
pub fn sign_params(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&");
    hex::encode(Sha256::digest(format!("{joined}{secret}").as_bytes()))
}

#[async_trait]
impl ImageHost for CloudinaryClient {
    async fn upload(&self, image: &UploadedFile, folder: &str) -> Result<String> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(&[("folder", folder), ("timestamp", timestamp.as_str())], &self.api_secret);

        let mut part = multipart::Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone().unwrap_or_else(|| "upload".into()));
        if let Some(ct) = &image.content_type {
            part = part.mime_str(ct).context("invalid image content type")?;
        }
        let form = multipart::Form::new()
            .part("file", part)
            .text("folder", folder.to_string())
            .text("timestamp", timestamp)
            .text("api_key", self.api_key.clone())
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let url = format!("https://api.cloudinary.com/v1_1/{}/image/upload", self.cloud_name);
        info!(folder, bytes = image.bytes.len(), "uploading image");
        let response = self.client.post(&url).multipart(form).send().await.context("image upload request failed")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("image upload rejected with {status}: {body}"));
        }
        let parsed: UploadResponse = response.json().await.context("unexpected image upload response")?;
        Ok(parsed.secure_url)
    }
}

/// Used when no image host credentials are configured.
pub struct UnconfiguredImageHost;

#[async_trait]
impl ImageHost for UnconfiguredImageHost {
    async fn upload(&self, _image: &UploadedFile, _folder: &str) -> Result<String> {
        Err(anyhow!("image host is not configured"))
    }
}
