//! # Order Routes
//!
//! `POST /orders` is the entry point of order creation.
//!
//! ```text
//! body ──► OrderRequest::new        structure and limits     ─┐
//!      ──► user exists?                                        ├─► 422 {status:"error", errors}
//!      ──► every product id exists?                           ─┘
//!      ──► OrderService::create_order
//!             ├── Ok(order)     ──► 201 {status:"success", order_id, message}
//!             ├── Rejected(..)  ──► 422 {status:"fail", code, message}
//!             └── Store(..)     ──► 500
//! ```

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use shop_core::{
    Order, OrderFilter, OrderId, OrderItemRequest, OrderRequest, OrderWithItems, PageRequest,
    UserId, ValidationError,
};

use super::{parse_number, Listing};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::order_service::OrderService;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(show_order))
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderBody {
    /// Defaults to the authenticated user.
    pub user_id: Option<UserId>,
    pub comment: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Serialize)]
pub struct OrderCreated {
    pub status: &'static str,
    pub order_id: OrderId,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub status: &'static str,
    pub data: OrderWithItems,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    pub user_id: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    body: Result<Json<CreateOrderBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<OrderCreated>)> {
    let Json(body) = body?;

    let request = validate_order(&state, &auth, body).await?;
    let order = OrderService::new(state.db.clone()).create_order(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderCreated {
            status: "success",
            order_id: order.id,
            message: "Order created successfully",
        }),
    ))
}

/// Checks everything the order service takes for granted.
async fn validate_order(
    state: &AppState,
    auth: &AuthUser,
    body: CreateOrderBody,
) -> Result<OrderRequest, ApiError> {
    let user_id = body.user_id.unwrap_or(auth.user.id);
    let comment = body.comment.filter(|c| !c.is_empty());
    let items = body.items;

    let request = OrderRequest::new(user_id, comment, items)?;

    let mut errors: Vec<ValidationError> = Vec::new();

    if !state.db.users().exists(user_id).await? {
        errors.push(ValidationError::UnknownReference {
            field: "user_id".to_string(),
            value: user_id.to_string(),
        });
    }

    let found = state.db.products().find_by_ids(&request.product_ids()).await?;
    for (i, item) in request.items().iter().enumerate() {
        if !found.contains_key(&item.product_id) {
            errors.push(ValidationError::UnknownReference {
                field: format!("items.{i}.product_id"),
                value: item.product_id.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(request)
    } else {
        Err(ApiError::validation(errors))
    }
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    query: Result<Query<OrderQuery>, QueryRejection>,
) -> ApiResult<Json<Listing<Order>>> {
    let Query(query) = query?;

    let user_id = parse_number::<UserId>("user_id", query.user_id.as_deref())?;
    let page = parse_number::<u32>("page", query.page.as_deref())?;
    let per_page = parse_number::<u32>("per_page", query.per_page.as_deref())?;
    let page = PageRequest::new(page, per_page)?;

    let orders = state.db.orders().list(&OrderFilter { user_id }, page).await?;

    Ok(Json(orders.into()))
}

async fn show_order(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    id: Result<Path<OrderId>, PathRejection>,
) -> ApiResult<Json<OrderDetail>> {
    let Path(id) = id?;

    let order = state
        .db
        .orders()
        .get_with_items(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", id))?;

    Ok(Json(OrderDetail {
        status: "success",
        data: order,
    }))
}

// =============================================================================
// Unit Tests
// =============================================================================
