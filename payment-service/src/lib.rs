pub mod config;
pub mod grpc;
pub mod services;
pub mod startup;

pub use startup::{AppState, Application};
