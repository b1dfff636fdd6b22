//! Mock storefront API surface
//!
//! Implements the exact endpoint set the engine consumes, speaking the
//! `ApiResponse` envelope on success and failure alike.

use crate::state::{MockStorefront, ServerLine};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    routing::{delete, get, patch, post},
};
use serde_json::json;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{
    AddressType, DeliveryAddress, Order, OrderLineSnapshot, OrderPricing, PaymentInit,
    PaymentMethod, PlaceOrderResponse, ServiceabilityResult, VerifyOutcome,
};
use shared::request::{
    AddCartItemRequest, PlaceOrderRequest, ServiceabilityRequest, VerifyPaymentRequest,
};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use validator::Validate;

type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

fn require_auth(headers: &HeaderMap) -> Result<(), AppError> {
    let ok = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer "));
    if ok { Ok(()) } else { Err(AppError::not_authenticated()) }
}

// ============================================================================
// Cart
// ============================================================================

async fn get_cart(
    State(state): State<Arc<MockStorefront>>,
    headers: HeaderMap,
) -> ApiResult<shared::models::CartSnapshot> {
    state.cart_calls.fetch_add(1, Ordering::SeqCst);
    require_auth(&headers)?;
    Ok(Json(ApiResponse::success(state.snapshot())))
}

async fn add_cart_item(
    State(state): State<Arc<MockStorefront>>,
    headers: HeaderMap,
    Json(req): Json<AddCartItemRequest>,
) -> ApiResult<serde_json::Value> {
    state.cart_calls.fetch_add(1, Ordering::SeqCst);
    require_auth(&headers)?;
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    if state.fail_cart_mutations.load(Ordering::SeqCst) {
        return Err(AppError::internal("injected cart failure"));
    }
    if !state.serviceable.load(Ordering::SeqCst) {
        return Err(AppError::not_serviceable());
    }

    let variant = state
        .catalog
        .get(&req.variant_id)
        .map(|v| v.value().clone())
        .ok_or_else(|| AppError::not_found("variant"))?;
    if !variant.in_stock() {
        return Err(AppError::out_of_stock(variant.id.clone()));
    }

    let mut cart = state.cart.lock();
    let line_id = match cart.iter_mut().find(|l| l.variant_id == req.variant_id) {
        Some(line) => {
            line.quantity += req.quantity;
            line.line_id.clone()
        }
        None => {
            let line_id = state.next_line_id();
            cart.push(ServerLine {
                line_id: line_id.clone(),
                variant_id: req.variant_id.clone(),
                quantity: req.quantity,
            });
            line_id
        }
    };

    Ok(Json(ApiResponse::success(json!({ "line_id": line_id }))))
}

fn mutate_line(
    state: &MockStorefront,
    line_id: &str,
    f: impl FnOnce(&mut ServerLine) -> bool,
) -> Result<(), AppError> {
    state.cart_calls.fetch_add(1, Ordering::SeqCst);
    if state.fail_cart_mutations.load(Ordering::SeqCst) {
        return Err(AppError::internal("injected cart failure"));
    }

    let mut cart = state.cart.lock();
    let pos = cart
        .iter()
        .position(|l| l.line_id == line_id)
        .ok_or_else(|| AppError::new(ErrorCode::LineNotFound))?;

    let keep = f(&mut cart[pos]);
    if !keep {
        cart.remove(pos);
    }
    Ok(())
}

async fn increment_line(
    State(state): State<Arc<MockStorefront>>,
    headers: HeaderMap,
    Path(line_id): Path<String>,
) -> ApiResult<()> {
    require_auth(&headers)?;
    mutate_line(&state, &line_id, |l| {
        l.quantity += 1;
        true
    })?;
    Ok(Json(ApiResponse::ok()))
}

async fn decrement_line(
    State(state): State<Arc<MockStorefront>>,
    headers: HeaderMap,
    Path(line_id): Path<String>,
) -> ApiResult<()> {
    require_auth(&headers)?;
    mutate_line(&state, &line_id, |l| {
        l.quantity = l.quantity.saturating_sub(1);
        l.quantity > 0
    })?;
    Ok(Json(ApiResponse::ok()))
}

async fn remove_line(
    State(state): State<Arc<MockStorefront>>,
    headers: HeaderMap,
    Path(line_id): Path<String>,
) -> ApiResult<()> {
    require_auth(&headers)?;
    mutate_line(&state, &line_id, |_| false)?;
    Ok(Json(ApiResponse::ok()))
}

// ============================================================================
// Orders
// ============================================================================

fn address_for(id: &str) -> DeliveryAddress {
    DeliveryAddress {
        id: id.to_string(),
        address_type: AddressType::Home,
        line1: "12 Lake Rd".into(),
        line2: None,
        landmark: None,
        coordinates: None,
        is_default: true,
    }
}

async fn place_order(
    State(state): State<Arc<MockStorefront>>,
    headers: HeaderMap,
    Json(req): Json<PlaceOrderRequest>,
) -> ApiResult<PlaceOrderResponse> {
    require_auth(&headers)?;
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    if state.fail_next_order.swap(false, Ordering::SeqCst) {
        return Err(AppError::with_message(
            ErrorCode::SubmissionFailed,
            "injected submission failure",
        ));
    }

    // Build immutable line snapshots from the submitted items
    let inputs = req.items.clone().unwrap_or_default();
    if inputs.is_empty() {
        return Err(AppError::new(ErrorCode::CartEmpty));
    }

    let mut items = Vec::with_capacity(inputs.len());
    let mut subtotal = 0.0;
    for input in &inputs {
        let variant = state
            .catalog
            .get(&input.variant_id)
            .map(|v| v.value().clone())
            .ok_or_else(|| AppError::not_found("variant"))?;
        subtotal += variant.unit_price * input.quantity as f64;
        items.push(OrderLineSnapshot {
            product_id: variant.product_id.clone(),
            variant_id: Some(variant.id.clone()),
            name: variant.name.clone(),
            unit_price: variant.unit_price,
            quantity: input.quantity,
            is_free_product: false,
        });
    }

    let delivery_charge = if subtotal < state.free_delivery_threshold {
        state.delivery_charge
    } else {
        0.0
    };
    let total = subtotal + delivery_charge;

    let (order_id, order_number) = state.next_order_id();
    let online = req.payment_method == PaymentMethod::OnlinePayment;
    let order = Order {
        id: order_id.clone(),
        order_number: order_number.clone(),
        status: if online {
            "PAYMENT_PENDING".into()
        } else {
            "CONFIRMED".into()
        },
        payment_method: req.payment_method,
        payment_status: online.then(|| "PENDING".to_string()),
        items,
        pricing: OrderPricing {
            subtotal,
            delivery_charge,
            tax: None,
            discount: None,
            total_amount: total,
        },
        delivery_address: address_for(&req.delivery_address_id),
        created_at: chrono::Utc::now().timestamp_millis(),
        timeline: None,
    };
    state.orders.insert(order_id.clone(), order.clone());

    // Cash orders consume the server cart immediately; online ones only
    // on verified payment
    if !online {
        state.cart.lock().clear();
    }

    let payment = online.then(|| PaymentInit {
        gateway_data: shared::models::GatewayData {
            key_id: "rzp_test_mock".into(),
            gateway_order_id: format!("gw-{}", uuid::Uuid::new_v4()),
            amount: (total * 100.0).round() as i64,
            currency: "INR".into(),
        },
    });

    tracing::info!(order = %order_id, number = %order_number, online, "Mock order created");
    Ok(Json(ApiResponse::success(PlaceOrderResponse { order, payment })))
}

async fn order_history(
    State(state): State<Arc<MockStorefront>>,
    headers: HeaderMap,
) -> ApiResult<Vec<Order>> {
    require_auth(&headers)?;
    let mut orders: Vec<Order> = state.orders.iter().map(|e| e.value().clone()).collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(ApiResponse::success(orders)))
}

async fn get_order(
    State(state): State<Arc<MockStorefront>>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> ApiResult<Order> {
    require_auth(&headers)?;
    let order = state
        .orders
        .get(&order_id)
        .map(|e| e.value().clone())
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    Ok(Json(ApiResponse::success(order)))
}

// ============================================================================
// Payments / serviceability
// ============================================================================

async fn verify_payment(
    State(state): State<Arc<MockStorefront>>,
    headers: HeaderMap,
    Json(req): Json<VerifyPaymentRequest>,
) -> ApiResult<VerifyOutcome> {
    state.verify_calls.fetch_add(1, Ordering::SeqCst);
    require_auth(&headers)?;
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let mut order = state
        .orders
        .get_mut(&req.order_id)
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    // An absent payload (dismissal/failure on the surface) never verifies
    if req.payment_data.is_none() || state.fail_verify.load(Ordering::SeqCst) {
        tracing::info!(order = %req.order_id, "Mock verification rejected");
        return Ok(Json(ApiResponse::success(VerifyOutcome {
            verified: false,
            order_status: Some(order.status.clone()),
        })));
    }

    order.status = "PAYMENT_CONFIRMED".into();
    order.payment_status = Some("PAID".into());
    state.cart.lock().clear();

    tracing::info!(order = %req.order_id, "Mock verification confirmed");
    Ok(Json(ApiResponse::success(VerifyOutcome {
        verified: true,
        order_status: Some("PAYMENT_CONFIRMED".into()),
    })))
}

async fn check_serviceability(
    State(state): State<Arc<MockStorefront>>,
    Json(req): Json<ServiceabilityRequest>,
) -> ApiResult<ServiceabilityResult> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let available = state.serviceable.load(Ordering::SeqCst);
    Ok(Json(ApiResponse::success(ServiceabilityResult {
        available,
        estimated_delivery_minutes: available.then_some(30),
    })))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: Arc<MockStorefront>) -> Router {
    Router::new()
        .route("/api/cart", get(get_cart))
        .route("/api/cart/add", post(add_cart_item))
        .route("/api/cart/item/{id}/increment", patch(increment_line))
        .route("/api/cart/item/{id}/decrement", patch(decrement_line))
        .route("/api/cart/item/{id}", delete(remove_line))
        .route("/api/orders", post(place_order))
        .route("/api/orders/history", get(order_history))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/payments/verify", post(verify_payment))
        .route("/api/service-area/check", post(check_serviceability))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
