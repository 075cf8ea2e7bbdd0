//! Role, resource and access rule domain models

use serde::{Deserialize, Serialize};

/// Role（命名的权限集合）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// Resource（受保护的实体类别，例如 "products"）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Resource {
    pub id: i64,
    pub code: String,
    pub description: String,
}

/// 用户与角色的多对多绑定
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRole {
    pub id: i64,
    pub user_id: i64,
    pub role_id: i64,
}

/// 角色对资源的权限规则：七个独立的布尔标志
/// "all" 为真时忽略所有权；仅当 "all" 为假时 "own" 的归属匹配才生效
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccessRule {
    pub id: i64,
    pub role_id: i64,
    pub resource_id: i64,

    pub read_own: bool,
    pub read_all: bool,
    /// 列名 can_create（"create" 是 SQL 保留字），API 字段仍为 "create"
    #[sqlx(rename = "can_create")]
    #[serde(rename = "create")]
    pub create: bool,
    pub update_own: bool,
    pub update_all: bool,
    pub delete_own: bool,
    pub delete_all: bool,
}

/// Create/update role request
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Create/update resource request
#[derive(Debug, Deserialize)]
pub struct ResourceRequest {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

/// Create/update access rule request（PATCH 整体替换七个标志）
#[derive(Debug, Deserialize)]
pub struct AccessRuleRequest {
    pub role_id: i64,
    pub resource_id: i64,

    #[serde(default)]
    pub read_own: bool,
    #[serde(default)]
    pub read_all: bool,
    #[serde(default, rename = "create")]
    pub create: bool,
    #[serde(default)]
    pub update_own: bool,
    #[serde(default)]
    pub update_all: bool,
    #[serde(default)]
    pub delete_own: bool,
    #[serde(default)]
    pub delete_all: bool,
}
