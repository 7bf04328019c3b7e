//! gRPC implementation of PaymentService.

use crate::grpc::proto::{
    payment_service_server::PaymentService, CreateOrderRequest, CreateOrderResponse,
    FetchOrdersRequest, FetchOrdersResponse, Order, VerifyPaymentRequest, VerifyPaymentResponse,
};
use crate::services::gateway::{GatewayOrder, OrderFilters};
use crate::services::{metrics, razorpay};
use crate::AppState;
use secrecy::ExposeSecret;
use tonic::{Request, Response, Status};
use uuid::Uuid;

pub struct PaymentGrpcService {
    state: AppState,
}

impl PaymentGrpcService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

/// Resolve the effective currency; the gateway default is INR.
fn resolve_currency(currency: Option<&str>) -> &str {
    match currency {
        Some(c) if !c.is_empty() => c,
        _ => "INR",
    }
}

/// Convert a gateway order into its wire representation.
fn order_to_proto(order: GatewayOrder) -> Order {
    Order {
        order_id: order.id,
        amount: order.amount as i64,
        currency: order.currency,
        receipt_id: order.receipt.unwrap_or_default(),
        status: order.status,
        created_at: order.created_at,
    }
}

#[tonic::async_trait]
impl PaymentService for PaymentGrpcService {
    async fn create_order(
        &self,
        request: Request<CreateOrderRequest>,
    ) -> Result<Response<CreateOrderResponse>, Status> {
        let req = request.into_inner();

        // Validate before any gateway round-trip is attempted.
        if req.amount <= 0 {
            return Err(Status::invalid_argument("Amount must be greater than zero"));
        }

        let currency = resolve_currency(req.currency.as_deref()).to_string();
        let receipt_id = Uuid::new_v4().to_string();

        tracing::info!(
            amount = req.amount,
            currency = %currency,
            receipt_id = %receipt_id,
            "Creating order"
        );

        let gateway = self.state.gateway.get()?;
        let order = gateway
            .create_order(req.amount as u64, &currency, &receipt_id)
            .await
            .map_err(|e| {
                metrics::record_order("failed");
                tracing::error!(error = %e, "Failed to create order with Razorpay");
                Status::internal(format!("Failed to create order with Razorpay: {}", e))
            })?;

        metrics::record_order("created");
        tracing::info!(order_id = %order.id, receipt_id = %receipt_id, "Order created");

        Ok(Response::new(CreateOrderResponse {
            order_id: order.id,
            receipt_id,
            amount: order.amount as i64,
            currency: order.currency,
            created_at: chrono::Utc::now().timestamp(),
        }))
    }

    async fn verify_payment(
        &self,
        request: Request<VerifyPaymentRequest>,
    ) -> Result<Response<VerifyPaymentResponse>, Status> {
        let req = request.into_inner();

        if req.order_id.is_empty() || req.payment_id.is_empty() || req.signature.is_empty() {
            return Err(Status::invalid_argument(
                "Missing required fields: order_id, payment_id, or signature",
            ));
        }

        let valid = razorpay::verify_payment_signature(
            self.state.config.razorpay.key_secret.expose_secret(),
            &req.order_id,
            &req.payment_id,
            &req.signature,
        )
        .map_err(|e| {
            tracing::error!(error = %e, "Signature verification error");
            Status::internal("Signature verification failed")
        })?;

        if !valid {
            metrics::record_verification("invalid");
            tracing::warn!(
                order_id = %req.order_id,
                payment_id = %req.payment_id,
                "Payment signature verification failed"
            );
            return Err(Status::invalid_argument(
                "Invalid payment signature. Verification failed.",
            ));
        }

        metrics::record_verification("valid");
        tracing::info!(
            order_id = %req.order_id,
            payment_id = %req.payment_id,
            "Payment signature verified"
        );

        Ok(Response::new(VerifyPaymentResponse {
            valid: true,
            message: "Payment verified successfully".to_string(),
        }))
    }

    async fn fetch_orders(
        &self,
        request: Request<FetchOrdersRequest>,
    ) -> Result<Response<FetchOrdersResponse>, Status> {
        let req = request.into_inner();

        if req.count <= 0 {
            return Err(Status::invalid_argument(
                "Count is required and must be greater than zero",
            ));
        }

        // Only filters that were actually supplied reach the gateway.
        let filters = OrderFilters {
            count: req.count,
            skip: req.skip,
            from: req.from.filter(|v| *v > 0),
            to: req.to.filter(|v| *v > 0),
            receipt: req.receipt.filter(|r| !r.is_empty()),
        };

        tracing::info!(count = filters.count, skip = filters.skip, "Fetching orders");

        let gateway = self.state.gateway.get()?;
        let orders = gateway.list_orders(&filters).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch orders with Razorpay");
            Status::internal(format!("Failed to fetch orders with Razorpay: {}", e))
        })?;

        tracing::info!(returned = orders.len(), "Orders fetched");

        Ok(Response::new(FetchOrdersResponse {
            orders: orders.into_iter().map(order_to_proto).collect(),
        }))
    }
}
