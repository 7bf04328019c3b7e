//! Capability interface to the external payment gateway.
//!
//! The orchestration layer only ever sees this narrow surface, so tests can
//! substitute an in-process implementation without any network access.

use crate::config::RazorpayConfig;
use crate::services::razorpay::RazorpayClient;
use anyhow::Result;
use secrecy::Secret;
use service_core::error::AppError;
use std::sync::{Arc, OnceLock};

/// An order as seen at the gateway boundary.
///
/// All field extraction from the gateway's wire shapes happens before data
/// crosses into business logic.
#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
    pub created_at: i64,
}

/// Filters for listing orders. Optional filters are sent to the gateway
/// only when present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilters {
    pub count: i64,
    pub skip: i64,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub receipt: Option<String>,
}

#[async_trait::async_trait]
pub trait OrderGateway: Send + Sync {
    async fn create_order(&self, amount: u64, currency: &str, receipt: &str)
        -> Result<GatewayOrder>;

    async fn list_orders(&self, filters: &OrderFilters) -> Result<Vec<GatewayOrder>>;
}

/// Construct-once access to the shared gateway client.
///
/// The first access builds the client from configuration; missing
/// credentials leave the handle permanently unusable and every later access
/// reports the same failure without retrying construction. After a
/// successful initialization all callers share the one client.
#[derive(Clone)]
pub struct GatewayAccessor {
    config: RazorpayConfig,
    client: Arc<OnceLock<Option<Arc<dyn OrderGateway>>>>,
}

impl GatewayAccessor {
    pub fn new(config: RazorpayConfig) -> Self {
        Self {
            config,
            client: Arc::new(OnceLock::new()),
        }
    }

    /// Pre-seed the accessor with an already-built gateway, bypassing
    /// credential handling. Lets tests substitute a fake implementation.
    pub fn with_gateway(gateway: Arc<dyn OrderGateway>) -> Self {
        let client = OnceLock::new();
        let _ = client.set(Some(gateway));
        Self {
            config: RazorpayConfig {
                key_id: String::new(),
                key_secret: Secret::new(String::new()),
                api_base_url: String::new(),
            },
            client: Arc::new(client),
        }
    }

    pub fn get(&self) -> Result<Arc<dyn OrderGateway>, AppError> {
        let slot = self.client.get_or_init(|| {
            if !self.config.is_configured() {
                tracing::warn!("Razorpay credentials not configured - gateway client unavailable");
                return None;
            }
            tracing::info!("Razorpay client initialized");
            Some(Arc::new(RazorpayClient::new(self.config.clone())) as Arc<dyn OrderGateway>)
        });

        slot.clone().ok_or_else(|| {
            AppError::GatewayNotConfigured(
                "failed to initialize Razorpay client: API key or secret is missing".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopGateway;

    #[async_trait::async_trait]
    impl OrderGateway for NoopGateway {
        async fn create_order(
            &self,
            amount: u64,
            currency: &str,
            receipt: &str,
        ) -> Result<GatewayOrder> {
            Ok(GatewayOrder {
                id: "order_noop".to_string(),
                amount,
                currency: currency.to_string(),
                receipt: Some(receipt.to_string()),
                status: "created".to_string(),
                created_at: 0,
            })
        }

        async fn list_orders(&self, _filters: &OrderFilters) -> Result<Vec<GatewayOrder>> {
            Ok(Vec::new())
        }
    }

    fn configured() -> RazorpayConfig {
        RazorpayConfig {
            key_id: "rzp_test_123".to_string(),
            key_secret: Secret::new("test_secret".to_string()),
            api_base_url: "http://127.0.0.1:1".to_string(),
        }
    }

    fn unconfigured() -> RazorpayConfig {
        RazorpayConfig {
            key_id: String::new(),
            key_secret: Secret::new(String::new()),
            api_base_url: "http://127.0.0.1:1".to_string(),
        }
    }

    #[test]
    fn missing_credentials_fail_identically_on_every_access() {
        let accessor = GatewayAccessor::new(unconfigured());

        let first = accessor.get().err().unwrap();
        let second = accessor.get().err().unwrap();

        assert!(matches!(first, AppError::GatewayNotConfigured(_)));
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn concurrent_first_access_constructs_exactly_one_client() {
        let accessor = GatewayAccessor::new(configured());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let accessor = accessor.clone();
                std::thread::spawn(move || accessor.get().unwrap())
            })
            .collect();

        let clients: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for client in &clients[1..] {
            assert!(Arc::ptr_eq(&clients[0], client));
        }
    }

    #[test]
    fn preseeded_gateway_is_returned_as_is() {
        let gateway: Arc<dyn OrderGateway> = Arc::new(NoopGateway);
        let accessor = GatewayAccessor::with_gateway(gateway.clone());

        let got = accessor.get().unwrap();
        assert!(Arc::ptr_eq(&gateway, &got));
    }
}
