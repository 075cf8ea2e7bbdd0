//! 账户服务：注册、登录、登出、资料维护、软删除

use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::{jwt::JwtService, password::PasswordHasher},
    config::AppConfig,
    error::AppError,
    models::{
        auth::LoginRequest,
        session::Session,
        user::{RegisterRequest, UpdateProfileRequest, User},
    },
    repository::{SessionRepository, UserRepository},
};

pub struct AccountService {
    db: PgPool,
    jwt: Arc<JwtService>,
    config: Arc<AppConfig>,
}

impl AccountService {
    pub fn new(db: PgPool, jwt: Arc<JwtService>, config: Arc<AppConfig>) -> Self {
        Self { db, jwt, config }
    }

    /// 注册新用户
    pub async fn register(&self, req: RegisterRequest) -> Result<User, AppError> {
        if req.password != req.password2 {
            return Err(AppError::BadRequest("Passwords do not match".to_string()));
        }

        let email = req.email.to_lowercase();

        let user_repo = UserRepository::new(self.db.clone());
        if user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::BadRequest("Email already registered".to_string()));
        }

        let hasher = PasswordHasher::new();
        let password_hash = hasher.hash(&req.password)?;

        let user = user_repo.create(&req.full_name, &email, &password_hash).await?;

        tracing::info!(user_id = user.id, "User registered");

        Ok(user)
    }

    /// 登录：校验口令，创建会话，签发令牌
    /// 未知邮箱、停用账号、口令错误统一返回 Unauthorized，不区分原因
    pub async fn login(
        &self,
        req: LoginRequest,
        client_ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<(User, Session, String), AppError> {
        let email = req.email.to_lowercase();

        let user_repo = UserRepository::new(self.db.clone());
        let user = user_repo
            .find_by_email(&email)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::Unauthorized)?;

        let hasher = PasswordHasher::new();
        hasher.verify(&req.password, &user.password_hash)?;

        // 每次登录都创建新会话，从不刷新旧会话
        let expires_at =
            Utc::now() + Duration::days(self.config.security.session_expire_days as i64);

        let session_repo = SessionRepository::new(self.db.clone());
        let session = session_repo
            .create(user.id, expires_at, client_ip, user_agent)
            .await?;

        let token = self.jwt.issue(user.id, session.id)?;

        tracing::info!(user_id = user.id, session_id = %session.id, "User logged in");

        Ok((user, session, token))
    }

    /// 登出：撤销当前会话
    pub async fn logout(&self, session_id: Uuid) -> Result<(), AppError> {
        let session_repo = SessionRepository::new(self.db.clone());
        session_repo.revoke(session_id).await?;

        Ok(())
    }

    /// 更新用户资料（邮箱变更时检查占用）
    pub async fn update_profile(
        &self,
        user: &User,
        req: UpdateProfileRequest,
    ) -> Result<User, AppError> {
        let user_repo = UserRepository::new(self.db.clone());

        let email = req.email.map(|e| e.to_lowercase());
        if let Some(ref email) = email {
            if user_repo.email_taken_by_other(email, user.id).await? {
                return Err(AppError::BadRequest("Email already in use".to_string()));
            }
        }

        let updated = user_repo
            .update_profile(user.id, req.full_name.as_deref(), email.as_deref())
            .await?
            .ok_or(AppError::NotFound)?;

        Ok(updated)
    }

    /// 软删除：停用账号并批量撤销其全部活跃会话
    pub async fn deactivate(&self, user_id: i64) -> Result<u64, AppError> {
        let user_repo = UserRepository::new(self.db.clone());
        user_repo.deactivate(user_id).await?;

        let session_repo = SessionRepository::new(self.db.clone());
        let revoked = session_repo.revoke_all_for_user(user_id).await?;

        tracing::info!(user_id = user_id, revoked_sessions = revoked, "User deactivated");

        Ok(revoked)
    }
}
