use payment_service::config::{Config, RazorpayConfig, ServerConfig};
use payment_service::grpc::proto::payment_service_client::PaymentServiceClient;
use payment_service::startup::Application;
use secrecy::Secret;
use tonic::transport::Channel;
use wiremock::MockServer;

pub const TEST_AUTH_TOKEN: &str = "test-auth-token";
pub const TEST_GATEWAY_SECRET: &str = "test_key_secret";

pub struct TestApp {
    pub http_address: String,
    pub grpc_address: String,
    pub gateway: MockServer,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let gateway = MockServer::start().await;
        let razorpay = RazorpayConfig {
            key_id: "rzp_test_key".to_string(),
            key_secret: Secret::new(TEST_GATEWAY_SECRET.to_string()),
            api_base_url: gateway.uri(),
        };
        Self::spawn_with(razorpay, gateway).await
    }

    /// Spawn with empty gateway credentials to exercise the permanently
    /// unusable gateway handle.
    pub async fn spawn_without_gateway_credentials() -> Self {
        let gateway = MockServer::start().await;
        let razorpay = RazorpayConfig {
            key_id: String::new(),
            key_secret: Secret::new(String::new()),
            api_base_url: gateway.uri(),
        };
        Self::spawn_with(razorpay, gateway).await
    }

    async fn spawn_with(razorpay: RazorpayConfig, gateway: MockServer) -> Self {
        // Every test app shares the same token; the gate reads it lazily.
        std::env::set_var("AUTH_KEY", TEST_AUTH_TOKEN);

        let config = Config {
            server: ServerConfig {
                port: 0,      // Random port
                grpc_port: 0, // Random port
            },
            razorpay,
            service_name: "payment-service-test".to_string(),
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let http_port = app.http_port();
        let grpc_port = app.grpc_port();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("http://127.0.0.1:{}/health", http_port);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        // Additional wait for gRPC server
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestApp {
            http_address: format!("http://127.0.0.1:{}", http_port),
            grpc_address: format!("http://127.0.0.1:{}", grpc_port),
            gateway,
        }
    }

    /// Create a gRPC client connected to this test app.
    pub async fn grpc_client(&self) -> PaymentServiceClient<Channel> {
        PaymentServiceClient::connect(self.grpc_address.clone())
            .await
            .expect("Failed to connect to gRPC server")
    }

    /// Build a request carrying the shared authorization token.
    pub fn authed<T>(&self, message: T) -> tonic::Request<T> {
        let mut request = tonic::Request::new(message);
        request
            .metadata_mut()
            .insert("authorization", TEST_AUTH_TOKEN.parse().unwrap());
        request
    }

    /// Requests the mock gateway has received so far.
    pub async fn gateway_requests(&self) -> Vec<wiremock::Request> {
        self.gateway.received_requests().await.unwrap_or_default()
    }
}
