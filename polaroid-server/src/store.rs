//! Cloudinary client: signed uploads plus a best-effort resource listing.

use crate::config::CloudinaryConfig;
use crate::error::StoreError;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::time::Duration;

/// Upper bound on gallery entries per listing.
const LIST_LIMIT: u32 = 50;

/// Conservative fixed timeout for all Cloudinary calls. No retries.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// A stored photo as the remote host describes it. Read-only on our side.
#[derive(Debug, Clone, Deserialize)]
pub struct GalleryEntry {
    pub public_id: String,
    pub secure_url: String,
    #[serde(default)]
    #[allow(dead_code)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize)]
struct ResourceList {
    #[serde(default)]
    resources: Vec<GalleryEntry>,
}

pub struct CloudinaryStore {
    http: reqwest::Client,
    cfg: CloudinaryConfig,
}

impl CloudinaryStore {
    pub fn new(cfg: CloudinaryConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self { http, cfg })
    }

    /// Upload an encoded JPEG under the configured folder using Cloudinary's
    /// signed upload protocol.
    pub async fn upload(&self, public_id: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let timestamp = chrono::Utc::now().timestamp();
        let signature = sign_upload(&self.cfg.folder, public_id, timestamp, &self.cfg.api_secret);
        let file = reqwest::multipart::Part::bytes(bytes)
            .file_name(format!("{public_id}.jpg"))
            .mime_str("image/jpeg")?;
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("api_key", self.cfg.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("public_id", public_id.to_string())
            .text("folder", self.cfg.folder.clone())
            .text("signature", signature);
        let url = format!(
            "{}/v1_1/{}/image/upload",
            self.cfg.api_base.trim_end_matches('/'),
            self.cfg.cloud_name
        );
        let resp = self.http.post(&url).multipart(form).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Api { status, body });
        }
        Ok(())
    }

    /// List the newest photos under the configured folder, at most
    /// [`LIST_LIMIT`] of them.
    pub async fn list_recent(&self) -> Result<Vec<GalleryEntry>, StoreError> {
        let url = format!(
            "{}/v1_1/{}/resources/image/upload",
            self.cfg.api_base.trim_end_matches('/'),
            self.cfg.cloud_name
        );
        // Trailing slash keeps sibling folders sharing the name prefix out.
        let prefix = format!("{}/", self.cfg.folder);
        let max_results = LIST_LIMIT.to_string();
        let resp = self
            .http
            .get(&url)
            .basic_auth(&self.cfg.api_key, Some(&self.cfg.api_secret))
            .query(&[
                ("prefix", prefix.as_str()),
                ("max_results", max_results.as_str()),
                ("direction", "desc"),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Api { status, body });
        }
        let listing: ResourceList = resp.json().await?;
        Ok(listing.resources)
    }
}

/// Hex SHA-1 of the alphabetically ordered signed params concatenated with
/// the API secret, per Cloudinary's signed-upload contract.
fn sign_upload(folder: &str, public_id: &str, timestamp: i64, api_secret: &str) -> String {
    let to_sign = format!("folder={folder}&public_id={public_id}&timestamp={timestamp}{api_secret}");
    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_signature_matches_known_digest() {
        let sig = sign_upload("festa_tios", "bodas_20260805_210000", 1754424000, "topsecret");
        assert_eq!(sig, "fae4665f21e7f7813e7b2a5c8ce3366271544aa5");
    }

    #[test]
    fn signature_depends_on_the_secret() {
        let a = sign_upload("f", "p", 1, "secret-a");
        let b = sign_upload("f", "p", 1, "secret-b");
        assert_ne!(a, b);
    }

    #[test]
    fn listing_deserializes_cloudinary_shape() {
        let raw = r#"{
            "resources": [
                {
                    "public_id": "festa_tios/bodas_20260805_210000",
                    "secure_url": "https://res.cloudinary.com/demo/image/upload/v1/festa_tios/bodas_20260805_210000.jpg",
                    "created_at": "2026-08-05T21:00:00Z"
                }
            ]
        }"#;
        let listing: ResourceList = serde_json::from_str(raw).unwrap();
        assert_eq!(listing.resources.len(), 1);
        let entry = &listing.resources[0];
        assert_eq!(entry.public_id, "festa_tios/bodas_20260805_210000");
        assert!(entry.created_at.is_some());
    }

    #[test]
    fn listing_tolerates_missing_resources_key() {
        let listing: ResourceList = serde_json::from_str("{}").unwrap();
        assert!(listing.resources.is_empty());
    }
}
