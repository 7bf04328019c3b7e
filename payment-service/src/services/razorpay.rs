//! Razorpay payment provider client.
//!
//! Implements Razorpay's Orders API for order creation and listing, and the
//! signature scheme used to confirm a payment completion.

use crate::config::RazorpayConfig;
use crate::services::gateway::{GatewayOrder, OrderFilters, OrderGateway};
use anyhow::{anyhow, Result};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use service_core::utils::signature;

/// Razorpay client for interacting with the Razorpay Orders API.
#[derive(Clone)]
pub struct RazorpayClient {
    client: Client,
    config: RazorpayConfig,
}

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    /// Amount in smallest currency unit (paise for INR).
    amount: u64,
    currency: &'a str,
    receipt: &'a str,
}

/// An order as Razorpay returns it.
#[derive(Debug, Deserialize)]
struct RazorpayOrder {
    id: String,
    amount: u64,
    currency: String,
    receipt: Option<String>,
    status: String,
    created_at: i64,
}

impl From<RazorpayOrder> for GatewayOrder {
    fn from(order: RazorpayOrder) -> Self {
        Self {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
            receipt: order.receipt,
            status: order.status,
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OrderCollection {
    count: i64,
    items: Vec<RazorpayOrder>,
}

/// Razorpay API error envelope.
#[derive(Debug, Deserialize)]
struct RazorpayError {
    error: RazorpayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorDetail {
    code: String,
    description: String,
}

fn api_error(body: &str) -> anyhow::Error {
    match serde_json::from_str::<RazorpayError>(body) {
        Ok(err) => anyhow!(
            "Razorpay error: {} - {}",
            err.error.code,
            err.error.description
        ),
        Err(_) => anyhow!("Razorpay error: {}", body),
    }
}

impl RazorpayClient {
    pub fn new(config: RazorpayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait::async_trait]
impl OrderGateway for RazorpayClient {
    async fn create_order(
        &self,
        amount: u64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder> {
        let url = format!("{}/orders", self.config.api_base_url);
        let body = CreateOrderBody {
            amount,
            currency,
            receipt,
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.config.key_id,
                Some(self.config.key_secret.expose_secret()),
            )
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        tracing::debug!(status = %status, "Razorpay create_order response");

        if !status.is_success() {
            let err = api_error(&text);
            tracing::error!(error = %err, "Razorpay order creation failed");
            return Err(err);
        }

        let order: RazorpayOrder = serde_json::from_str(&text)?;
        tracing::info!(
            order_id = %order.id,
            amount = order.amount,
            currency = %order.currency,
            "Razorpay order created"
        );
        Ok(order.into())
    }

    async fn list_orders(&self, filters: &OrderFilters) -> Result<Vec<GatewayOrder>> {
        let url = format!("{}/orders", self.config.api_base_url);

        let mut query: Vec<(&str, String)> = vec![
            ("count", filters.count.to_string()),
            ("skip", filters.skip.to_string()),
        ];
        if let Some(from) = filters.from {
            query.push(("from", from.to_string()));
        }
        if let Some(to) = filters.to {
            query.push(("to", to.to_string()));
        }
        if let Some(receipt) = &filters.receipt {
            query.push(("receipt", receipt.clone()));
        }

        let response = self
            .client
            .get(&url)
            .basic_auth(
                &self.config.key_id,
                Some(self.config.key_secret.expose_secret()),
            )
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = api_error(&text);
            tracing::error!(error = %err, "Razorpay order listing failed");
            return Err(err);
        }

        let collection: OrderCollection = serde_json::from_str(&text)?;
        tracing::debug!(count = collection.count, "Razorpay orders fetched");
        Ok(collection.items.into_iter().map(GatewayOrder::from).collect())
    }
}

/// Expected signature for a payment completion.
///
/// Computed as `HMAC-SHA256(order_id + "|" + payment_id, key_secret)`,
/// rendered as lowercase hex.
pub fn payment_signature(secret: &str, order_id: &str, payment_id: &str) -> Result<String> {
    signature::hmac_sha256_hex(secret, &format!("{}|{}", order_id, payment_id))
}

/// Verify a claimed payment signature in constant time.
pub fn verify_payment_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    claimed: &str,
) -> Result<bool> {
    signature::verify_hmac_sha256_hex(secret, &format!("{}|{}", order_id, payment_id), claimed)
}
