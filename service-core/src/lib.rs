//! service-core: Shared infrastructure for the payment RPC service.
pub mod error;
pub mod grpc;
pub mod utils;

pub use tonic;
pub use tower;
pub use tracing;
