//! 访问控制管理的 HTTP 处理器
//! 角色 / 资源 / 访问规则的 CRUD，全部要求 admin 角色

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::{
    error::AppError,
    middleware::AppState,
    models::{
        access::{AccessRuleRequest, ResourceRequest, RoleRequest},
        session::Principal,
    },
    repository::AccessRepository,
};

// ==================== Roles ====================

/// 列出角色
pub async fn list_roles(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<impl IntoResponse, AppError> {
    state.access.require_admin(principal.user.id).await?;

    let repo = AccessRepository::new(state.db.clone());
    let roles = repo.list_roles().await?;

    Ok(Json(roles))
}

/// 创建角色
pub async fn create_role(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(req): Json<RoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.access.require_admin(principal.user.id).await?;

    let repo = AccessRepository::new(state.db.clone());
    if repo.find_role_by_name(&req.name).await?.is_some() {
        return Err(AppError::BadRequest("Role already exists".to_string()));
    }

    let role = repo.create_role(&req.name, &req.description).await?;

    Ok((StatusCode::CREATED, Json(role)))
}

/// 更新角色
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(role_id): Path<i64>,
    Json(req): Json<RoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.access.require_admin(principal.user.id).await?;

    let repo = AccessRepository::new(state.db.clone());
    let role = repo
        .update_role(role_id, &req.name, &req.description)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(role))
}

/// 删除角色
pub async fn delete_role(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(role_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.access.require_admin(principal.user.id).await?;

    let repo = AccessRepository::new(state.db.clone());
    if !repo.delete_role(role_id).await? {
        return Err(AppError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

// ==================== Resources ====================

/// 列出资源
pub async fn list_resources(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<impl IntoResponse, AppError> {
    state.access.require_admin(principal.user.id).await?;

    let repo = AccessRepository::new(state.db.clone());
    let resources = repo.list_resources().await?;

    Ok(Json(resources))
}

/// 创建资源
pub async fn create_resource(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(req): Json<ResourceRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.access.require_admin(principal.user.id).await?;

    let repo = AccessRepository::new(state.db.clone());
    if repo.find_resource_by_code(&req.code).await?.is_some() {
        return Err(AppError::BadRequest("Resource already exists".to_string()));
    }

    let resource = repo.create_resource(&req.code, &req.description).await?;

    Ok((StatusCode::CREATED, Json(resource)))
}

/// 更新资源
pub async fn update_resource(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(resource_id): Path<i64>,
    Json(req): Json<ResourceRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.access.require_admin(principal.user.id).await?;

    let repo = AccessRepository::new(state.db.clone());
    let resource = repo
        .update_resource(resource_id, &req.code, &req.description)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(resource))
}

/// 删除资源
pub async fn delete_resource(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(resource_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.access.require_admin(principal.user.id).await?;

    let repo = AccessRepository::new(state.db.clone());
    if !repo.delete_resource(resource_id).await? {
        return Err(AppError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

// ==================== Access rules ====================

/// 列出访问规则
pub async fn list_rules(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<impl IntoResponse, AppError> {
    state.access.require_admin(principal.user.id).await?;

    let repo = AccessRepository::new(state.db.clone());
    let rules = repo.list_rules().await?;

    Ok(Json(rules))
}

/// 创建访问规则（每个 (角色, 资源) 对至多一条）
pub async fn create_rule(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(req): Json<AccessRuleRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.access.require_admin(principal.user.id).await?;

    let repo = AccessRepository::new(state.db.clone());
    if repo
        .find_rule_by_pair(req.role_id, req.resource_id)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(
            "Rule already exists for this role and resource".to_string(),
        ));
    }

    let rule = repo.create_rule(&req).await?;

    Ok((StatusCode::CREATED, Json(rule)))
}

/// 更新访问规则（七个标志整体替换）
pub async fn update_rule(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(rule_id): Path<i64>,
    Json(req): Json<AccessRuleRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.access.require_admin(principal.user.id).await?;

    let repo = AccessRepository::new(state.db.clone());
    let rule = repo
        .update_rule(rule_id, &req)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(rule))
}

/// 删除访问规则
pub async fn delete_rule(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(rule_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.access.require_admin(principal.user.id).await?;

    let repo = AccessRepository::new(state.db.clone());
    if !repo.delete_rule(rule_id).await? {
        return Err(AppError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}
