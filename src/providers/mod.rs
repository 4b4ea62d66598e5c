mod azure_vision;
mod factory;
mod google_vision;

pub use azure_vision::AzureVisionProvider;
pub use factory::ProviderFactory;
pub use google_vision::GoogleVisionProvider;

use async_trait::async_trait;

use crate::error::VisionError;

/// Unified trait for all object-detection providers
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Get the provider name (e.g., "azure", "google")
    fn provider_name(&self) -> &str;

    /// Detect objects in the image and return one label per object
    async fn analyze(&self, image: &[u8]) -> Result<Vec<String>, VisionError>;
}
