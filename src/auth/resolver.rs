//! 请求认证解析器
//! 每个请求解析一次凭证：先走 Bearer JWT，再走会话 Cookie。
//! 凭证缺失或无效不是错误 —— 请求以匿名身份继续，由各 handler 自行拒绝。

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::jwt::JwtService,
    error::AppError,
    models::{
        session::{Principal, Session},
        user::User,
    },
};

/// 会话存储的只读视图
/// 用户随会话一起返回，使有效性判定（含 user.is_active）一次完成
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 仅按会话 id 查找（cookie 路径）
    async fn find(&self, session_id: Uuid) -> Result<Option<(User, Session)>, AppError>;

    /// 按 (会话 id, 用户 id) 查找（bearer 路径，声明中的 uid 必须匹配）
    async fn find_for_user(
        &self,
        session_id: Uuid,
        user_id: i64,
    ) -> Result<Option<(User, Session)>, AppError>;
}

/// 凭证解析器：多来源、固定优先级
pub struct CredentialResolver<S> {
    sessions: S,
    jwt: Arc<JwtService>,
    cookie_name: String,
}

impl<S: SessionStore> CredentialResolver<S> {
    pub fn new(sessions: S, jwt: Arc<JwtService>, cookie_name: String) -> Self {
        Self {
            sessions,
            jwt,
            cookie_name,
        }
    }

    /// 解析请求中的主体
    /// 只读操作；返回 Ok(None) 表示匿名请求
    pub async fn resolve(
        &self,
        headers: &HeaderMap,
        cookies: &CookieJar,
    ) -> Result<Option<Principal>, AppError> {
        let now = Utc::now();

        // 1) Bearer JWT
        // 签名/声明/格式错误一律视为"没有携带凭证"，静默落入 cookie 路径；
        // bearer 命中有效会话时立即短路，cookie 不再参与
        if let Some(token) = bearer_token(headers) {
            if let Ok(claims) = self.jwt.decode(token) {
                if let Ok(session_id) = Uuid::parse_str(&claims.sid) {
                    if let Some((user, session)) =
                        self.sessions.find_for_user(session_id, claims.uid).await?
                    {
                        let principal = Principal { user, session };
                        if principal.is_valid(now) {
                            return Ok(Some(principal));
                        }
                    }
                }
            }
        }

        // 2) 会话 Cookie（原始会话 id）
        if let Some(cookie) = cookies.get(&self.cookie_name) {
            if let Ok(session_id) = Uuid::parse_str(cookie.value()) {
                if let Some((user, session)) = self.sessions.find(session_id).await? {
                    let principal = Principal { user, session };
                    if principal.is_valid(now) {
                        return Ok(Some(principal));
                    }
                }
            }
        }

        Ok(None)
    }
}

/// 从 Authorization 头提取 bearer 令牌
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// 认证中间件：包裹所有路由，为请求附加已解析的主体
/// 本中间件从不因"未认证"而拒绝请求 —— 匿名与否由 handler 的签名决定
pub async fn authentication_middleware(
    State(state): State<Arc<crate::middleware::AppState>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(principal) = state.resolver.resolve(req.headers(), &jar).await? {
        req.extensions_mut().insert(principal);
    }

    Ok(next.run(req).await)
}

// 实现 FromRequestParts，使受保护的 handler 在签名中声明对主体的依赖；
// 缺失主体 -> 401（区别于授权失败的 403）
impl<St> FromRequestParts<St> for Principal
where
    St: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &St,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
