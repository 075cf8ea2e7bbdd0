//! 认证相关的 HTTP 处理器
//! 登录在设置会话 Cookie 的同时返回 bearer 令牌，两种凭证等效

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use validator::Validate;

use crate::{
    error::AppError,
    middleware::{client_ip, AppState},
    models::{
        auth::{LoginRequest, LoginResponse},
        session::Principal,
        user::{RegisterRequest, UpdateProfileRequest, UserResponse},
    },
};

/// 注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let user = state.account_service.register(req).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ip = client_ip(&headers);
    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let (user, session, token) = state
        .account_service
        .login(req, ip.as_deref(), user_agent.as_deref())
        .await?;

    let jar = jar.add(session_cookie(&state, session.id.to_string()));

    Ok((
        jar,
        Json(LoginResponse {
            user: UserResponse::from(user),
            token,
        }),
    ))
}

/// 登出：撤销当前会话并清除 Cookie
pub async fn logout(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    state.account_service.logout(principal.session.id).await?;

    let jar = jar.remove(removal_cookie(&state));

    Ok((jar, StatusCode::NO_CONTENT))
}

/// 获取当前用户信息
pub async fn me(principal: Principal) -> Json<UserResponse> {
    Json(UserResponse::from(principal.user))
}

/// 更新当前用户资料
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    req.validate()?;

    let updated = state
        .account_service
        .update_profile(&principal.user, req)
        .await?;

    Ok(Json(UserResponse::from(updated)))
}

/// 注销账号：软删除 + 撤销全部会话 + 清除 Cookie
pub async fn delete_me(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    state.account_service.deactivate(principal.user.id).await?;

    let jar = jar.remove(removal_cookie(&state));

    Ok((jar, StatusCode::NO_CONTENT))
}

/// 构造会话 Cookie
/// HttpOnly + SameSite=Lax；Secure 与 Max-Age（= 会话 TTL 秒数）由配置决定
fn session_cookie(state: &AppState, session_id: String) -> Cookie<'static> {
    let security = &state.config.security;
    let max_age_secs = security.session_expire_days as i64 * 24 * 60 * 60;

    Cookie::build((security.cookie_name.clone(), session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(security.cookie_secure)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// 构造用于删除的同名 Cookie
fn removal_cookie(state: &AppState) -> Cookie<'static> {
    Cookie::build((state.config.security.cookie_name.clone(), ""))
        .path("/")
        .build()
}
