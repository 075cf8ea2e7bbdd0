//! 业务资源的 HTTP 处理器（mock 数据）
//! 商品与订单只演示决策引擎的接入方式：数据是静态的，写操作不落库。
//! 状态约定：未认证 401，无权限 403，目标不存在 404（先于鉴权判定）。

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::{
    error::AppError,
    middleware::AppState,
    models::session::Principal,
    services::Action,
};

/// Mock 商品行
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: i64,
    pub owner_id: i64,
    pub name: &'static str,
    pub price_cents: i64,
}

/// Mock 订单行
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: i64,
    pub owner_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

/// 静态商品数据；owner_id 对应种子用户
const PRODUCTS: &[Product] = &[
    Product { id: 1, owner_id: 1, name: "Mechanical keyboard", price_cents: 12900 },
    Product { id: 2, owner_id: 2, name: "USB-C dock", price_cents: 8900 },
    Product { id: 3, owner_id: 3, name: "Laptop stand", price_cents: 4900 },
    Product { id: 4, owner_id: 3, name: "Webcam cover", price_cents: 500 },
];

/// 静态订单数据
const ORDERS: &[Order] = &[
    Order { id: 1, owner_id: 2, product_id: 1, quantity: 1 },
    Order { id: 2, owner_id: 3, product_id: 2, quantity: 2 },
    Order { id: 3, owner_id: 3, product_id: 4, quantity: 10 },
];

const PRODUCTS_RESOURCE: &str = "products";
const ORDERS_RESOURCE: &str = "orders";

// ==================== Products ====================

/// 商品列表
/// read_all -> 全部行；只有 read_own -> 过滤到本人行
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<impl IntoResponse, AppError> {
    let user_id = principal.user.id;

    state
        .access
        .require(user_id, PRODUCTS_RESOURCE, Action::Read, None)
        .await?;

    if state
        .access
        .grants_all(user_id, PRODUCTS_RESOURCE, Action::Read)
        .await?
    {
        return Ok(Json(PRODUCTS.to_vec()));
    }

    let own: Vec<Product> = PRODUCTS
        .iter()
        .filter(|p| p.owner_id == user_id)
        .cloned()
        .collect();

    Ok(Json(own))
}

/// 商品详情
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let product = PRODUCTS
        .iter()
        .find(|p| p.id == product_id)
        .ok_or(AppError::NotFound)?;

    state
        .access
        .require(
            principal.user.id,
            PRODUCTS_RESOURCE,
            Action::Read,
            Some(product.owner_id),
        )
        .await?;

    Ok(Json(product.clone()))
}

/// 创建商品（mock：只返回确认，不落库）
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<impl IntoResponse, AppError> {
    state
        .access
        .require(principal.user.id, PRODUCTS_RESOURCE, Action::Create, None)
        .await?;

    Ok(Json(json!({
        "detail": "Created (mock)",
        "owner_id": principal.user.id
    })))
}

/// 更新商品（mock）
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let product = PRODUCTS
        .iter()
        .find(|p| p.id == product_id)
        .ok_or(AppError::NotFound)?;

    state
        .access
        .require(
            principal.user.id,
            PRODUCTS_RESOURCE,
            Action::Update,
            Some(product.owner_id),
        )
        .await?;

    Ok(Json(json!({
        "detail": "Updated (mock)",
        "id": product_id
    })))
}

/// 删除商品（mock）
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let product = PRODUCTS
        .iter()
        .find(|p| p.id == product_id)
        .ok_or(AppError::NotFound)?;

    state
        .access
        .require(
            principal.user.id,
            PRODUCTS_RESOURCE,
            Action::Delete,
            Some(product.owner_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ==================== Orders ====================

/// 订单列表
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<impl IntoResponse, AppError> {
    let user_id = principal.user.id;

    state
        .access
        .require(user_id, ORDERS_RESOURCE, Action::Read, None)
        .await?;

    if state
        .access
        .grants_all(user_id, ORDERS_RESOURCE, Action::Read)
        .await?
    {
        return Ok(Json(ORDERS.to_vec()));
    }

    let own: Vec<Order> = ORDERS
        .iter()
        .filter(|o| o.owner_id == user_id)
        .cloned()
        .collect();

    Ok(Json(own))
}

/// 订单详情
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let order = ORDERS
        .iter()
        .find(|o| o.id == order_id)
        .ok_or(AppError::NotFound)?;

    state
        .access
        .require(
            principal.user.id,
            ORDERS_RESOURCE,
            Action::Read,
            Some(order.owner_id),
        )
        .await?;

    Ok(Json(order.clone()))
}

/// 创建订单（mock）
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<impl IntoResponse, AppError> {
    state
        .access
        .require(principal.user.id, ORDERS_RESOURCE, Action::Create, None)
        .await?;

    Ok(Json(json!({
        "detail": "Created (mock)",
        "owner_id": principal.user.id
    })))
}

/// 更新订单（mock）
pub async fn update_order(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let order = ORDERS
        .iter()
        .find(|o| o.id == order_id)
        .ok_or(AppError::NotFound)?;

    state
        .access
        .require(
            principal.user.id,
            ORDERS_RESOURCE,
            Action::Update,
            Some(order.owner_id),
        )
        .await?;

    Ok(Json(json!({
        "detail": "Updated (mock)",
        "id": order_id
    })))
}

/// 删除订单（mock）
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let order = ORDERS
        .iter()
        .find(|o| o.id == order_id)
        .ok_or(AppError::NotFound)?;

    state
        .access
        .require(
            principal.user.id,
            ORDERS_RESOURCE,
            Action::Delete,
            Some(order.owner_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
