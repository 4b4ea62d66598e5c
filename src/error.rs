use thiserror::Error;

/// Failures reported by a vision provider adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VisionError {
    /// The provider answered with a structured failure
    #[error("{message}")]
    Provider {
        status: u16,
        code: String,
        message: String,
    },

    /// Anything else: transport failures, malformed responses
    #[error("{0}")]
    Unexpected(String),
}

// Request URLs can carry credentials, so they never reach the message
impl From<reqwest::Error> for VisionError {
    fn from(err: reqwest::Error) -> Self {
        VisionError::Unexpected(err.without_url().to_string())
    }
}

/// Errors that can occur while analyzing an uploaded image
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// No image, or an empty one, was supplied
    #[error("No image file uploaded.")]
    Validation,

    /// The vision provider reported a failure; status and code pass through unchanged
    #[error("Vision provider error ({status}): {message}")]
    Provider {
        status: u16,
        code: String,
        message: String,
    },

    /// Any other failure during analysis
    #[error("Unexpected error: {0}")]
    Unexpected(String),

    /// Analyzer builder configuration error
    #[error("Builder error: {0}")]
    Builder(String),
}

impl From<VisionError> for AnalyzeError {
    fn from(err: VisionError) -> Self {
        match err {
            VisionError::Provider {
                status,
                code,
                message,
            } => AnalyzeError::Provider {
                status,
                code,
                message,
            },
            VisionError::Unexpected(details) => AnalyzeError::Unexpected(details),
        }
    }
}

/// Errors raised while loading a recipe catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Catalog file could not be read
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file is not a JSON array of recipes
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two recipes share an id
    #[error("Duplicate recipe id {0} in catalog")]
    DuplicateId(u32),

    /// Catalog contains no recipes
    #[error("Catalog contains no recipes")]
    Empty,
}

/// Errors that abort service startup
#[derive(Error, Debug)]
pub enum StartupError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Recipe catalog could not be loaded
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Vision provider could not be constructed
    #[error("Provider error: {0}")]
    Provider(String),

    /// Listener could not be bound or the server failed
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}
