use std::sync::Arc;

use crate::config::VisionConfig;
use crate::error::VisionError;
use crate::providers::{AzureVisionProvider, GoogleVisionProvider, VisionProvider};

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(config: &VisionConfig) -> Result<Arc<dyn VisionProvider>, VisionError> {
        match config.provider.as_str() {
            "azure" => Ok(Arc::new(AzureVisionProvider::new(config)?)),
            "google" => Ok(Arc::new(GoogleVisionProvider::new(config)?)),
            other => Err(VisionError::Unexpected(format!(
                "Unknown vision provider: {}",
                other
            ))),
        }
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["azure", "google"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_vision_config(provider: &str) -> VisionConfig {
        VisionConfig {
            provider: provider.to_string(),
            endpoint: "https://example.invalid".to_string(),
            key: "test-key".to_string(),
            timeout: 30,
        }
    }

    #[test]
    fn test_create_azure_provider() {
        let provider = ProviderFactory::create(&create_test_vision_config("azure")).unwrap();
        assert_eq!(provider.provider_name(), "azure");
    }

    #[test]
    fn test_create_google_provider() {
        let provider = ProviderFactory::create(&create_test_vision_config("google")).unwrap();
        assert_eq!(provider.provider_name(), "google");
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = ProviderFactory::create(&create_test_vision_config("rekognition"));
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("Unknown vision provider"));
        }
    }

    #[test]
    fn test_available_providers() {
        let providers = ProviderFactory::available_providers();
        assert_eq!(providers, vec!["azure", "google"]);
    }
}
