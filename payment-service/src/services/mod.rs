pub mod gateway;
pub mod metrics;
pub mod razorpay;

pub use gateway::{GatewayAccessor, OrderGateway};
pub use metrics::{get_metrics, init_metrics};
pub use razorpay::RazorpayClient;
