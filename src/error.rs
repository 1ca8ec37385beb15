#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum LabelGateError {
    #[error("HTTP client initialization failed: {0}")]
    HttpClientInit(reqwest::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP middleware error: {0}")]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    #[error("API error from {api}: {message}")]
    Api { api: String, message: String },

    #[error("API JSON error from {api}: {source}")]
    ApiJson {
        api: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{entity} '{id}' not found.")]
    NotFound { entity: String, id: String },

    #[error(
        "API key required: {api} requires {env_var} environment variable.\n\nTo set:\n  export {env_var}=your-key\n\nMore info: {docs_url}"
    )]
    ApiKeyRequired {
        api: String,
        env_var: String,
        docs_url: String,
    },

    #[error("Invalid configuration: {var}: {message}")]
    InvalidConfig { var: String, message: String },

    #[error("Cache unavailable ({backend}): {message}")]
    Cache {
        backend: &'static str,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LabelGateError {
    pub(crate) fn drug_not_found(name: &str) -> Self {
        Self::NotFound {
            entity: "Drug".to_string(),
            id: name.to_string(),
        }
    }

    /// True for failures of the upstream label service itself: network errors,
    /// unexpected HTTP statuses and undecodable payloads.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::HttpMiddleware(_) | Self::Api { .. } | Self::ApiJson { .. }
        )
    }
}
