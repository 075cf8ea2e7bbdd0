//! Authentication-related models

use serde::{Deserialize, Serialize};

use super::user::UserResponse;

/// Login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response：用户信息 + bearer 令牌（会话 id 走 Set-Cookie）
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
}
