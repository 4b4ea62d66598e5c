use crate::config::VisionConfig;
use crate::error::VisionError;
use crate::providers::VisionProvider;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;

const API_VERSION: &str = "2023-10-01";
const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const ERROR_CODE_HEADER: &str = "x-ms-error-code";

/// Azure AI Vision Image Analysis 4.0, object detection feature
pub struct AzureVisionProvider {
    client: Client,
    endpoint: String,
    key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    #[serde(default)]
    objects_result: Option<ObjectsResult>,
}

#[derive(Debug, Deserialize)]
struct ObjectsResult {
    #[serde(default)]
    values: Vec<DetectedObject>,
}

#[derive(Debug, Deserialize)]
struct DetectedObject {
    #[serde(default)]
    tags: Vec<DetectedTag>,
}

#[derive(Debug, Deserialize)]
struct DetectedTag {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl AzureVisionProvider {
    /// Create a new Azure Vision provider from configuration
    pub fn new(config: &VisionConfig) -> Result<Self, VisionError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(AzureVisionProvider {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            key: config.key.clone(),
        })
    }

    #[doc(hidden)]
    pub fn with_endpoint(endpoint: String, key: String) -> Self {
        AzureVisionProvider {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key,
        }
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/computervision/imageanalysis:analyze?api-version={}&features=objects",
            self.endpoint, API_VERSION
        )
    }
}

#[async_trait]
impl VisionProvider for AzureVisionProvider {
    fn provider_name(&self) -> &str {
        "azure"
    }

    async fn analyze(&self, image: &[u8]) -> Result<Vec<String>, VisionError> {
        debug!("Sending {} bytes to Azure Vision", image.len());

        let response = self
            .client
            .post(self.analyze_url())
            .header(KEY_HEADER, &self.key)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let header_code = response
                .headers()
                .get(ERROR_CODE_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let body = response.text().await?;
            warn!("Azure Vision returned {}: {}", status, body);
            return Err(provider_failure(status.as_u16(), header_code, &body));
        }

        let body: AnalyzeResponse = response
            .json()
            .await
            .map_err(|e| {
                VisionError::Unexpected(format!(
                    "Invalid Azure Vision response: {}",
                    e.without_url()
                ))
            })?;
        debug!("Azure Vision response: {:?}", body);

        Ok(first_tag_labels(body))
    }
}

/// Takes the first tag of every detected object; objects without tags are skipped
fn first_tag_labels(response: AnalyzeResponse) -> Vec<String> {
    response
        .objects_result
        .map(|objects| objects.values)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|object| object.tags.into_iter().next())
        .map(|tag| tag.name.to_lowercase())
        .collect()
}

fn provider_failure(status: u16, header_code: Option<String>, body: &str) -> VisionError {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|parsed| parsed.error);

    let code = detail
        .as_ref()
        .and_then(|d| d.code.clone())
        .or(header_code)
        .unwrap_or_default();
    let message = detail
        .and_then(|d| d.message)
        .unwrap_or_else(|| body.to_string());

    VisionError::Provider {
        status,
        code,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn analyze_path() -> Matcher {
        Matcher::Regex(r"^/computervision/imageanalysis:analyze".to_string())
    }

    #[tokio::test]
    async fn test_provider_name() {
        let config = VisionConfig {
            provider: "azure".to_string(),
            endpoint: "https://myvision.cognitiveservices.azure.com/".to_string(),
            key: "test-key".to_string(),
            timeout: 30,
        };

        let provider = AzureVisionProvider::new(&config).unwrap();
        assert_eq!(provider.provider_name(), "azure");
        assert!(provider
            .analyze_url()
            .starts_with("https://myvision.cognitiveservices.azure.com/computervision/"));
    }

    #[tokio::test]
    async fn test_analyze_takes_first_tag_per_object() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", analyze_path())
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api-version".into(), "2023-10-01".into()),
                Matcher::UrlEncoded("features".into(), "objects".into()),
            ]))
            .match_header("Ocp-Apim-Subscription-Key", "test-key")
            .match_header("content-type", "application/octet-stream")
            .match_body("fake image bytes")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "modelVersion": "2023-10-01",
                    "objectsResult": {
                        "values": [
                            {
                                "boundingBox": {"x": 1, "y": 2, "w": 30, "h": 40},
                                "tags": [{"name": "Egg", "confidence": 0.91}, {"name": "food", "confidence": 0.5}]
                            },
                            {
                                "boundingBox": {"x": 5, "y": 6, "w": 10, "h": 10},
                                "tags": []
                            },
                            {
                                "boundingBox": {"x": 7, "y": 8, "w": 12, "h": 12},
                                "tags": [{"name": "butter", "confidence": 0.77}]
                            }
                        ]
                    }
                }"#,
            )
            .create_async()
            .await;

        let provider = AzureVisionProvider::with_endpoint(server.url(), "test-key".to_string());
        let labels = provider.analyze(b"fake image bytes").await.unwrap();

        assert_eq!(labels, vec!["egg", "butter"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_analyze_without_objects_result() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", analyze_path())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"modelVersion": "2023-10-01", "metadata": {"width": 10, "height": 10}}"#)
            .create_async()
            .await;

        let provider = AzureVisionProvider::with_endpoint(server.url(), "test-key".to_string());
        let labels = provider.analyze(b"img").await.unwrap();

        assert!(labels.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_analyze_structured_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", analyze_path())
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"error": {"code": "401", "message": "Access denied due to invalid subscription key or wrong API endpoint."}}"#,
            )
            .create_async()
            .await;

        let provider = AzureVisionProvider::with_endpoint(server.url(), "bad-key".to_string());
        let err = provider.analyze(b"img").await.unwrap_err();

        assert_eq!(
            err,
            VisionError::Provider {
                status: 401,
                code: "401".to_string(),
                message: "Access denied due to invalid subscription key or wrong API endpoint."
                    .to_string(),
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_analyze_error_code_from_header() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", analyze_path())
            .with_status(429)
            .with_header("x-ms-error-code", "TooManyRequests")
            .with_body("Rate limit exceeded")
            .create_async()
            .await;

        let provider = AzureVisionProvider::with_endpoint(server.url(), "test-key".to_string());
        let err = provider.analyze(b"img").await.unwrap_err();

        match err {
            VisionError::Provider {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 429);
                assert_eq!(code, "TooManyRequests");
                assert_eq!(message, "Rate limit exceeded");
            }
            other => panic!("Expected provider error, got {:?}", other),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_analyze_malformed_success_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", analyze_path())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json")
            .create_async()
            .await;

        let provider = AzureVisionProvider::with_endpoint(server.url(), "test-key".to_string());
        let err = provider.analyze(b"img").await.unwrap_err();

        assert!(matches!(err, VisionError::Unexpected(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unexpected() {
        let provider =
            AzureVisionProvider::with_endpoint("http://127.0.0.1:1".to_string(), "k".to_string());
        let err = provider.analyze(b"img").await.unwrap_err();
        assert!(matches!(err, VisionError::Unexpected(_)));
    }
}
