use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{error, warn};

use crate::domain::value_objects::profiles::CropArea;

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";
const AVATAR_SIZE: u32 = 400;

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudinaryResource {
    Image,
    Video,
}

impl CloudinaryResource {
    fn as_str(&self) -> &'static str {
        match self {
            CloudinaryResource::Image => "image",
            CloudinaryResource::Video => "video",
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CloudinaryUpload {
    pub public_id: String,
    pub secure_url: String,
    pub version: Option<i64>,
    pub format: Option<String>,
}

#[derive(Serialize)]
struct SignedUploadBody<'a> {
    file: &'a str,
    folder: &'a str,
    timestamp: i64,
    api_key: &'a str,
    signature: String,
    signature_algorithm: &'static str,
}

#[derive(Serialize)]
struct SignedDestroyBody<'a> {
    public_id: &'a str,
    timestamp: i64,
    api_key: &'a str,
    signature: String,
    signature_algorithm: &'static str,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

pub struct CloudinaryClient {
    http: reqwest::Client,
    api_base: String,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            config,
        }
    }

    pub fn cloud_name(&self) -> &str {
        &self.config.cloud_name
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        error!(
            status = %status,
            response_body = %body,
            context = %context,
            "cloudinary api request failed"
        );

        anyhow::bail!("Cloudinary API request failed: {} (status {})", context, status);
    }

    /// Signed upload of a data URI (or remote URL) into `folder`.
    pub async fn upload(
        &self,
        file: &str,
        folder: &str,
        resource: CloudinaryResource,
        timestamp: i64,
    ) -> Result<CloudinaryUpload> {
        let signature = sign_params(
            &[("folder", folder), ("timestamp", &timestamp.to_string())],
            &self.config.api_secret,
        );

        let body = SignedUploadBody {
            file,
            folder,
            timestamp,
            api_key: &self.config.api_key,
            signature,
            signature_algorithm: "sha256",
        };

        let resp = self
            .http
            .post(format!(
                "{}/{}/{}/upload",
                self.api_base,
                self.config.cloud_name,
                resource.as_str()
            ))
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "upload").await?;

        let upload: CloudinaryUpload = resp.json().await.context("invalid upload response")?;
        Ok(upload)
    }

    pub async fn destroy(
        &self,
        public_id: &str,
        resource: CloudinaryResource,
        timestamp: i64,
    ) -> Result<()> {
        let signature = sign_params(
            &[("public_id", public_id), ("timestamp", &timestamp.to_string())],
            &self.config.api_secret,
        );

        let body = SignedDestroyBody {
            public_id,
            timestamp,
            api_key: &self.config.api_key,
            signature,
            signature_algorithm: "sha256",
        };

        let resp = self
            .http
            .post(format!(
                "{}/{}/{}/destroy",
                self.api_base,
                self.config.cloud_name,
                resource.as_str()
            ))
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "destroy").await?;

        let destroyed: DestroyResponse = resp.json().await.context("invalid destroy response")?;
        if destroyed.result != "ok" {
            warn!(%public_id, result = %destroyed.result, "cloudinary: destroy did not remove asset");
        }

        Ok(())
    }
}

/// `sha256(k1=v1&k2=v2...{api_secret})` over the params sorted by key.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Delivery URL for an uploaded avatar. With a crop the image is cut to the
/// selected area and then filled to a 400x400 square.
pub fn avatar_delivery_url(cloud_name: &str, upload: &CloudinaryUpload, crop: Option<&CropArea>) -> String {
    let Some(crop) = crop else {
        return upload.secure_url.clone();
    };

    let version = upload
        .version
        .map(|version| format!("v{}/", version))
        .unwrap_or_default();
    let extension = upload
        .format
        .as_deref()
        .map(|format| format!(".{}", format))
        .unwrap_or_default();

    format!(
        "https://res.cloudinary.com/{}/image/upload/c_crop,x_{},y_{},w_{},h_{}/c_fill,w_{},h_{}/{}{}{}",
        cloud_name,
        crop.x,
        crop.y,
        crop.width,
        crop.height,
        AVATAR_SIZE,
        AVATAR_SIZE,
        version,
        upload.public_id,
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(format: &str) -> CloudinaryUpload {
        CloudinaryUpload {
            public_id: "avatars/u1/abc".to_string(),
            secure_url: format!("https://res.cloudinary.com/demo/image/upload/v17/avatars/u1/abc.{format}"),
            version: Some(17),
            format: Some(format.to_string()),
        }
    }

    #[test]
    fn signature_is_order_independent() {
        let a = sign_params(&[("timestamp", "1700000000"), ("folder", "avatars/u1")], "secret");
        let b = sign_params(&[("folder", "avatars/u1"), ("timestamp", "1700000000")], "secret");

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, sign_params(&[("folder", "avatars/u1"), ("timestamp", "1700000000")], "other"));
    }

    #[test]
    fn cropped_avatar_url_applies_crop_then_fill() {
        let crop = CropArea { x: 10, y: 20, width: 300, height: 300 };

        let url = avatar_delivery_url("demo", &upload("gif"), Some(&crop));

        assert_eq!(
            url,
            "https://res.cloudinary.com/demo/image/upload/c_crop,x_10,y_20,w_300,h_300/c_fill,w_400,h_400/v17/avatars/u1/abc.gif"
        );
    }

    #[test]
    fn uncropped_avatar_keeps_secure_url() {
        let upload = upload("png");
        assert_eq!(avatar_delivery_url("demo", &upload, None), upload.secure_url);
    }
}
