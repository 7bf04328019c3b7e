use thiserror::Error;
use tonic::Status;

/// Failures that cross component boundaries.
///
/// Per-call argument validation is reported directly as
/// `Status::invalid_argument` at the RPC layer; the variants here cover the
/// cross-cutting kinds: gate rejections, gateway-client configuration
/// failures, and infrastructure errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Payment gateway unavailable: {0}")]
    GatewayNotConfigured(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AppError> for Status {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Unauthenticated(msg) => Status::unauthenticated(msg),
            AppError::GatewayNotConfigured(msg) => Status::internal(msg),
            AppError::Internal(err) => Status::internal(err.to_string()),
            AppError::Io(err) => Status::internal(err.to_string()),
        }
    }
}
