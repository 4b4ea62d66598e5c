use crate::config::VisionConfig;
use crate::error::VisionError;
use crate::providers::VisionProvider;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Google Cloud Vision object localization
pub struct GoogleVisionProvider {
    client: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    localized_object_annotations: Vec<LocalizedObject>,
    #[serde(default)]
    error: Option<RpcStatus>,
}

#[derive(Debug, Deserialize)]
struct LocalizedObject {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: RpcStatus,
}

/// google.rpc.Status as returned in error bodies
#[derive(Debug, Deserialize)]
struct RpcStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GoogleVisionProvider {
    /// Create a new Google Vision provider from configuration
    pub fn new(config: &VisionConfig) -> Result<Self, VisionError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(GoogleVisionProvider {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.key.clone(),
        })
    }

    #[doc(hidden)]
    pub fn with_endpoint(endpoint: String, api_key: String) -> Self {
        GoogleVisionProvider {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl VisionProvider for GoogleVisionProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    async fn analyze(&self, image: &[u8]) -> Result<Vec<String>, VisionError> {
        let url = format!("{}/v1/images:annotate", self.endpoint);

        let request_body = json!({
            "requests": [{
                "image": {
                    "content": STANDARD.encode(image)
                },
                "features": [{
                    "type": "OBJECT_LOCALIZATION"
                }]
            }]
        });

        debug!("Sending object localization request to Google Vision API");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("Accept-Encoding", "identity")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            warn!("Google Vision API returned {}: {}", status, body);
            return Err(match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(parsed) => VisionError::Provider {
                    status: status.as_u16(),
                    code: parsed
                        .error
                        .status
                        .unwrap_or_else(|| status.as_u16().to_string()),
                    message: parsed.error.message,
                },
                Err(_) => VisionError::Provider {
                    status: status.as_u16(),
                    code: status.as_u16().to_string(),
                    message: body,
                },
            });
        }

        let body: AnnotateResponse = response.json().await.map_err(|e| {
            VisionError::Unexpected(format!(
                "Invalid Google Vision API response: {}",
                e.without_url()
            ))
        })?;
        debug!("Google Vision API response: {:?}", body);

        let image_response = match body.responses.into_iter().next() {
            Some(r) => r,
            None => return Ok(Vec::new()),
        };

        // Per-image failures arrive inside a 200 response
        if let Some(error) = image_response.error {
            return Err(rpc_failure(error));
        }

        Ok(image_response
            .localized_object_annotations
            .into_iter()
            .map(|object| object.name.to_lowercase())
            .collect())
    }
}

/// Maps a google.rpc.Status to the HTTP status the REST API would use for it
fn rpc_failure(error: RpcStatus) -> VisionError {
    let (status, code) = match error.code {
        3 => (400, "INVALID_ARGUMENT"),
        5 => (404, "NOT_FOUND"),
        7 => (403, "PERMISSION_DENIED"),
        8 => (429, "RESOURCE_EXHAUSTED"),
        13 => (500, "INTERNAL"),
        14 => (503, "UNAVAILABLE"),
        16 => (401, "UNAUTHENTICATED"),
        _ => (500, "UNKNOWN"),
    };

    VisionError::Provider {
        status,
        code: error.status.unwrap_or_else(|| code.to_string()),
        message: error.message,
    }
}
