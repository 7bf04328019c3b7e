//! gRPC interceptors for cross-cutting concerns.
//!
//! Provides interceptors for:
//! - The authorization gate applied to every inbound call
//! - Request ID propagation

use crate::error::AppError;
use std::sync::{Arc, OnceLock};
use subtle::ConstantTimeEq;
use tonic::metadata::MetadataMap;
use tonic::service::Interceptor;
use tonic::{Request, Status};

/// gRPC metadata key carrying the shared authorization token.
pub const AUTHORIZATION_KEY: &str = "authorization";

/// gRPC metadata key for request ID.
pub const REQUEST_ID_KEY: &str = "x-request-id";

type TokenLoader = dyn Fn() -> String + Send + Sync;

/// Authorization gate checked before any handler runs.
///
/// The expected token is loaded exactly once, on the first call that needs
/// it; an empty token is an unrecoverable deployment defect and panics.
/// After initialization every check is a constant-time comparison against
/// the cached value, safe for any number of concurrent callers.
#[derive(Clone)]
pub struct AuthGate {
    token: Arc<OnceLock<String>>,
    load: Arc<TokenLoader>,
}

impl AuthGate {
    /// Gate whose token is read from the given environment variable at
    /// first use.
    pub fn from_env(var: impl Into<String>) -> Self {
        let var = var.into();
        Self::from_loader(move || {
            let token = std::env::var(&var).unwrap_or_default();
            if token.is_empty() {
                panic!("{} environment variable is not set", var);
            }
            token
        })
    }

    /// Gate with a pre-seeded token. Lets tests bypass the environment.
    pub fn with_token(token: impl Into<String>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(token.into());
        Self {
            token: Arc::new(cell),
            load: Arc::new(|| String::new()),
        }
    }

    fn from_loader(load: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self {
            token: Arc::new(OnceLock::new()),
            load: Arc::new(load),
        }
    }

    fn expected(&self) -> &str {
        self.token.get_or_init(|| (self.load)())
    }

    /// Check the `authorization` metadata entry against the shared token.
    pub fn check(&self, metadata: &MetadataMap) -> Result<(), AppError> {
        let expected = self.expected();

        let provided = metadata
            .get(AUTHORIZATION_KEY)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if !provided.is_empty() && constant_time_eq(provided, expected) {
            return Ok(());
        }

        metrics::counter!("grpc_auth_rejections_total").increment(1);
        tracing::debug!("rejected request with missing or invalid authorization token");
        Err(AppError::Unauthenticated(
            "unauthorized: invalid or missing authorization token".to_string(),
        ))
    }
}

impl Interceptor for AuthGate {
    fn call(&mut self, request: Request<()>) -> Result<Request<()>, Status> {
        self.check(request.metadata())?;
        Ok(request)
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Interceptor that records the request ID from incoming metadata on the
/// current span.
#[allow(clippy::result_large_err)]
pub fn request_id_interceptor(request: Request<()>) -> Result<Request<()>, Status> {
    if let Some(request_id) = request.metadata().get(REQUEST_ID_KEY)
        && let Ok(request_id) = request_id.to_str()
    {
        tracing::Span::current().record("request_id", request_id);
    }

    Ok(request)
}

/// Extract request ID from incoming gRPC request metadata.
pub fn extract_request_id<T>(request: &Request<T>) -> Option<String> {
    request
        .metadata()
        .get(REQUEST_ID_KEY)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
