//! Detects ingredients in an uploaded photo and suggests recipes that use them.
//!
//! Image analysis is delegated to a [`VisionProvider`]; the detected labels are
//! matched against a read-only [`RecipeCatalog`] by [`match_recipes`].

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod error;
pub mod matcher;
pub mod model;
pub mod providers;
pub mod server;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

use std::net::SocketAddr;
use std::path::Path;

use log::info;

pub use analysis::{ImageAnalyzer, ImageAnalyzerBuilder};
pub use catalog::RecipeCatalog;
pub use crate::config::AppConfig;
pub use error::{AnalyzeError, CatalogError, StartupError, VisionError};
pub use matcher::match_recipes;
pub use model::{AnalysisOutcome, Recipe};
pub use providers::{ProviderFactory, VisionProvider};

/// Builds an analyzer from configuration: provider, catalog and timeout
pub async fn analyzer_from_config(config: &AppConfig) -> Result<ImageAnalyzer, StartupError> {
    let provider = ProviderFactory::create(&config.vision)
        .map_err(|e| StartupError::Provider(e.to_string()))?;

    let catalog = match &config.catalog.path {
        Some(path) => RecipeCatalog::from_file(Path::new(path)).await?,
        None => {
            info!("No catalog path configured, using the built-in sample recipes");
            RecipeCatalog::sample()
        }
    };

    ImageAnalyzer::builder()
        .shared_provider(provider)
        .catalog(catalog)
        .timeout(config.vision.timeout())
        .build()
        .map_err(|e| StartupError::Provider(e.to_string()))
}

/// Loads everything from `config` and serves until Ctrl-C
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    let analyzer = analyzer_from_config(&config).await?;
    info!(
        "Using {} vision provider with {} recipes",
        analyzer.provider_name(),
        analyzer.catalog().len()
    );

    let addr: SocketAddr = config.server.bind_address.parse().map_err(|e| {
        StartupError::Config(::config::ConfigError::Message(format!(
            "Invalid server.bind_address '{}': {}",
            config.server.bind_address, e
        )))
    })?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let app = server::router(analyzer, config.server.max_upload_bytes);
    server::serve(listener, app).await
}
