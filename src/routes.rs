//! 路由注册
//! 创建所有 API 路由并应用中间件。认证中间件覆盖全部路由但从不拒绝请求；
//! 是否要求主体由各 handler 的签名（Principal 提取器）决定。

use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};

use crate::{auth, handlers, middleware::AppState};

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 账户端点（register/login 公开，其余由 Principal 提取器把关）
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route(
            "/api/auth/me",
            get(handlers::auth::me)
                .patch(handlers::auth::update_me)
                .delete(handlers::auth::delete_me),
        );

    // 访问控制管理（admin 角色）
    let admin_routes = Router::new()
        .route(
            "/api/admin/roles",
            get(handlers::admin::list_roles).post(handlers::admin::create_role),
        )
        .route(
            "/api/admin/roles/{id}",
            patch(handlers::admin::update_role).delete(handlers::admin::delete_role),
        )
        .route(
            "/api/admin/resources",
            get(handlers::admin::list_resources).post(handlers::admin::create_resource),
        )
        .route(
            "/api/admin/resources/{id}",
            patch(handlers::admin::update_resource).delete(handlers::admin::delete_resource),
        )
        .route(
            "/api/admin/access-rules",
            get(handlers::admin::list_rules).post(handlers::admin::create_rule),
        )
        .route(
            "/api/admin/access-rules/{id}",
            patch(handlers::admin::update_rule).delete(handlers::admin::delete_rule),
        );

    // 业务资源（mock），逐请求经过决策引擎
    let business_routes = Router::new()
        .route(
            "/api/products",
            get(handlers::business::list_products).post(handlers::business::create_product),
        )
        .route(
            "/api/products/{id}",
            get(handlers::business::get_product)
                .patch(handlers::business::update_product)
                .delete(handlers::business::delete_product),
        )
        .route(
            "/api/orders",
            get(handlers::business::list_orders).post(handlers::business::create_order),
        )
        .route(
            "/api/orders/{id}",
            get(handlers::business::get_order)
                .patch(handlers::business::update_order)
                .delete(handlers::business::delete_order),
        );

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(admin_routes)
        .merge(business_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::resolver::authentication_middleware,
        ))
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .with_state(state)
}
