pub mod interceptors;

pub use interceptors::AuthGate;
