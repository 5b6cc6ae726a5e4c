use thiserror::Error;
use warp::http::StatusCode;
use warp::reject;

/// Failures of the generation backend or the video lookup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider is not configured: {0}")]
    NotConfigured(String),
    #[error("provider auth failed")]
    Auth,
    #[error("provider rate limited")]
    RateLimited,
    #[error("provider timeout")]
    Timeout,
    #[error("provider invalid response: {0}")]
    InvalidResponse(String),
    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("empty response received from the model")]
    EmptyResponse,
    #[error("no JSON document found in the model response")]
    NoJsonFound,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepairError {
    #[error("failed to parse model response as JSON: {0}")]
    Unrecoverable(String),
}

/// Terminal outcome of a document generation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Repair(#[from] RepairError),
    #[error("generated document is incomplete: {0}")]
    Validation(String),
}

impl GenerationError {
    /// Output-side failures are worth a second attempt with a simpler prompt.
    pub fn is_output_failure(&self) -> bool {
        !matches!(self, Self::Provider(_))
    }
}

/// Everything a handler can reject with. Rendered by `api::handlers::handle_rejection`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing required fields: {0}")]
    MissingFields(String),
    #[error("invalid request: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("rate limit exceeded, retry after {retry_after:.1}s")]
    RateLimited { retry_after: f64 },
}

impl reject::Reject for AppError {}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingFields(_) | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Generation(GenerationError::Provider(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFields(_) | Self::InvalidInput(_) => "missing_fields",
            Self::Generation(GenerationError::Provider(_)) => "ai_generation_failed",
            Self::Generation(GenerationError::Validation(_)) => "incomplete_content",
            Self::Generation(_) => "json_parse_error",
            Self::RateLimited { .. } => "rate_limit",
        }
    }

    /// Client-facing text. Provider and parser internals stay in the logs.
    pub fn message(&self) -> String {
        match self {
            Self::MissingFields(fields) => {
                format!("Missing required fields in request: {}", fields)
            }
            Self::InvalidInput(reason) => format!("Invalid request: {}", reason),
            Self::Generation(GenerationError::Provider(_)) => {
                "Failed to generate content. Please try again later.".to_string()
            }
            Self::Generation(GenerationError::Validation(reason)) => {
                format!("Generated content is incomplete. Please try again. Issue: {}", reason)
            }
            Self::Generation(_) => {
                "Failed to parse AI response. Please try again later.".to_string()
            }
            Self::RateLimited { .. } => "Rate limit exceeded. Please try again later.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let provider = AppError::from(GenerationError::Provider(ProviderError::Timeout));
        assert_eq!(provider.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(provider.code(), "ai_generation_failed");

        let parse = AppError::from(GenerationError::Extraction(ExtractionError::NoJsonFound));
        assert_eq!(parse.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(parse.code(), "json_parse_error");

        let invalid = AppError::from(GenerationError::Validation("x".into()));
        assert_eq!(invalid.code(), "incomplete_content");

        let limited = AppError::RateLimited { retry_after: 3.0 };
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_only_output_failures_are_retried() {
        assert!(!GenerationError::Provider(ProviderError::Auth).is_output_failure());
        assert!(GenerationError::Repair(RepairError::Unrecoverable("eof".into())).is_output_failure());
        assert!(GenerationError::Validation("modules".into()).is_output_failure());
    }
}
