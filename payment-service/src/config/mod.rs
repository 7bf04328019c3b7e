use anyhow::Result;
use dotenvy::dotenv;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub razorpay: RazorpayConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub grpc_port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: Secret<String>,
    pub api_base_url: String,
}

impl RazorpayConfig {
    pub fn is_configured(&self) -> bool {
        !self.key_id.is_empty() && !self.key_secret.expose_secret().is_empty()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let port = env::var("PAYMENT_SERVICE_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;
        let grpc_port = env::var("PAYMENT_SERVICE_GRPC_PORT")
            .unwrap_or_else(|_| "50051".to_string())
            .parse()?;

        // Gateway credentials may legitimately be absent here; the accessor
        // judges them at first gateway access, not at startup.
        let key_id = env::var("RAZORPAY_KEY").unwrap_or_default();
        let key_secret = env::var("RAZORPAY_SECRET").unwrap_or_default();
        let api_base_url = env::var("RAZORPAY_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.razorpay.com/v1".to_string());

        Ok(Self {
            server: ServerConfig { port, grpc_port },
            razorpay: RazorpayConfig {
                key_id,
                key_secret: Secret::new(key_secret),
                api_base_url,
            },
            service_name: "payment-service".to_string(),
        })
    }
}
