use crate::http::{self, HttpTransport, SharedHttpClient};
use crate::types::SharedEventBroadcaster;
use crate::{PlaylistError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http_types::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_MEDIA_BASE_URL: &str = "https://api.cloudinary.com";

/// Trait for the image host that can be mocked for testing.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait(?Send)]
pub trait MediaUploader {
    /// Upload a base64-encoded JPEG and return its secure URL.
    async fn upload_base64(&self, base64_image: &str) -> Result<String>;

    /// Upload raw image bytes and return their secure URL.
    async fn upload_image(&self, image: &[u8]) -> Result<String> {
        self.upload_base64(&STANDARD.encode(image)).await
    }
}

#[derive(Serialize)]
struct UploadRequest<'a> {
    file: String,
    upload_preset: &'a str,
    cloud_name: &'a str,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<UploadError>,
}

#[derive(Deserialize)]
struct UploadError {
    message: String,
}

/// [`MediaUploader`] posting unsigned uploads to Cloudinary.
#[derive(Clone, Debug)]
pub struct CloudinaryUploader {
    transport: HttpTransport,
    base_url: String,
    cloud_name: String,
    upload_preset: String,
}

impl CloudinaryUploader {
    pub fn new(client: SharedHttpClient, cloud_name: &str, upload_preset: &str) -> Self {
        Self::with_base_url(
            HttpTransport::new(client),
            DEFAULT_MEDIA_BASE_URL,
            cloud_name,
            upload_preset,
        )
    }

    pub fn with_shared_broadcaster(
        client: SharedHttpClient,
        cloud_name: &str,
        upload_preset: &str,
        broadcaster: Arc<SharedEventBroadcaster>,
    ) -> Self {
        Self::with_base_url(
            HttpTransport::with_broadcaster(client, broadcaster),
            DEFAULT_MEDIA_BASE_URL,
            cloud_name,
            upload_preset,
        )
    }

    pub fn with_base_url(
        transport: HttpTransport,
        base_url: &str,
        cloud_name: &str,
        upload_preset: &str,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            cloud_name: cloud_name.to_string(),
            upload_preset: upload_preset.to_string(),
        }
    }

    pub fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            self.base_url,
            urlencoding::encode(&self.cloud_name)
        )
    }
}

#[async_trait(?Send)]
impl MediaUploader for CloudinaryUploader {
    async fn upload_base64(&self, base64_image: &str) -> Result<String> {
        let body = UploadRequest {
            file: format!("data:image/jpg;base64,{base64_image}"),
            upload_preset: &self.upload_preset,
            cloud_name: &self.cloud_name,
        };
        let request = http::json_request(Method::Post, &self.upload_url(), &body)
            .map_err(PlaylistError::Upload)?;
        let mut response = self.transport.send(request).await.map_err(PlaylistError::Upload)?;

        // The answer decides, not the status: only a secure_url means success.
        let answer: UploadResponse = http::read_json(&mut response)
            .await
            .map_err(PlaylistError::Upload)?;
        parse_upload_answer(answer)
    }
}

fn parse_upload_answer(answer: UploadResponse) -> Result<String> {
    match answer {
        UploadResponse {
            secure_url: Some(url),
            ..
        } if !url.is_empty() => {
            log::debug!("Image uploaded to {url}");
            Ok(url)
        }
        UploadResponse {
            error: Some(error), ..
        } => Err(PlaylistError::Upload(error.message)),
        _ => Err(PlaylistError::Upload(
            "response did not contain a secure_url".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(json: &str) -> UploadResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_secure_url_is_returned() {
        let url = parse_upload_answer(answer(
            r#"{"secure_url": "https://res.cloudinary.com/x/image/upload/v1/a.jpg", "public_id": "a"}"#,
        ))
        .unwrap();
        assert_eq!(url, "https://res.cloudinary.com/x/image/upload/v1/a.jpg");
    }

    #[test]
    fn test_error_message_is_surfaced() {
        let err = parse_upload_answer(answer(
            r#"{"error": {"message": "Upload preset not found"}}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, PlaylistError::Upload(msg) if msg == "Upload preset not found"));
    }

    #[test]
    fn test_missing_url_is_a_failure() {
        assert!(matches!(
            parse_upload_answer(answer("{}")),
            Err(PlaylistError::Upload(_))
        ));
    }
}
