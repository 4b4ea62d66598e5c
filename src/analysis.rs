use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::catalog::RecipeCatalog;
use crate::error::AnalyzeError;
use crate::matcher::normalize_label;
use crate::model::AnalysisOutcome;
use crate::providers::VisionProvider;

/// Runs an image through the vision provider and matches the detections
/// against the recipe catalog.
///
/// Clones share the provider and catalog, so a single analyzer can be handed
/// to every request handler.
#[derive(Clone)]
pub struct ImageAnalyzer {
    provider: Arc<dyn VisionProvider>,
    catalog: RecipeCatalog,
    timeout: Option<Duration>,
}

impl ImageAnalyzer {
    /// Creates a new builder for an analyzer
    ///
    /// # Example
    /// ```
    /// use recipe_vision::ImageAnalyzer;
    ///
    /// let builder = ImageAnalyzer::builder();
    /// ```
    pub fn builder() -> ImageAnalyzerBuilder {
        ImageAnalyzerBuilder::default()
    }

    pub fn catalog(&self) -> &RecipeCatalog {
        &self.catalog
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Detects ingredients in `image` and returns the recipes that use any of them
    ///
    /// # Errors
    /// Returns `AnalyzeError` if:
    /// - `image` is empty
    /// - The vision provider reports a failure
    /// - The provider call fails or exceeds the configured timeout
    ///
    /// Finding no matching recipe is not an error; the outcome's
    /// `matching_recipes` is simply empty.
    pub async fn analyze(&self, image: &[u8]) -> Result<AnalysisOutcome, AnalyzeError> {
        if image.is_empty() {
            warn!("Rejecting empty image upload");
            return Err(AnalyzeError::Validation);
        }

        let call = self.provider.analyze(image);
        let labels = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                AnalyzeError::Unexpected(format!(
                    "Vision provider did not respond within {:?}",
                    limit
                ))
            })??,
            None => call.await?,
        };

        let detected_ingredients: Vec<String> =
            labels.iter().map(|label| normalize_label(label)).collect();
        debug!("Detected ingredients: {:?}", detected_ingredients);

        let matching_recipes: Vec<_> = self
            .catalog
            .matching(detected_ingredients.as_slice())
            .into_iter()
            .cloned()
            .collect();

        info!(
            "{} detected {} ingredients matching {} recipes",
            self.provider.provider_name(),
            detected_ingredients.len(),
            matching_recipes.len()
        );

        Ok(AnalysisOutcome {
            detected_ingredients,
            matching_recipes,
        })
    }
}

/// Builder for configuring an [`ImageAnalyzer`]
#[derive(Default)]
pub struct ImageAnalyzerBuilder {
    provider: Option<Arc<dyn VisionProvider>>,
    catalog: Option<RecipeCatalog>,
    timeout: Option<Duration>,
}

impl ImageAnalyzerBuilder {
    /// Set the vision provider used to detect objects
    pub fn provider<P: VisionProvider + 'static>(self, provider: P) -> Self {
        self.shared_provider(Arc::new(provider))
    }

    /// Set an already shared vision provider, e.g. one from `ProviderFactory`
    pub fn shared_provider(mut self, provider: Arc<dyn VisionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the recipe catalog; defaults to the built-in sample catalog
    pub fn catalog(mut self, catalog: RecipeCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Set a timeout for the provider call
    ///
    /// # Example
    /// ```
    /// use recipe_vision::ImageAnalyzer;
    /// use std::time::Duration;
    ///
    /// let builder = ImageAnalyzer::builder()
    ///     .timeout(Duration::from_secs(30));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Build the analyzer
    ///
    /// # Errors
    /// Returns `AnalyzeError::Builder` if no provider was specified
    pub fn build(self) -> Result<ImageAnalyzer, AnalyzeError> {
        let provider = self.provider.ok_or_else(|| {
            AnalyzeError::Builder(
                "No vision provider specified. Use .provider() or .shared_provider()".to_string(),
            )
        })?;

        Ok(ImageAnalyzer {
            provider,
            catalog: self.catalog.unwrap_or_default(),
            timeout: self.timeout,
        })
    }
}
