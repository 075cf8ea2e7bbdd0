//! Session repository (会话数据访问)
//! 创建是单条 INSERT；批量撤销是单条按 user_id 限定的 UPDATE，
//! 依赖数据库的单语句原子性，撤销之后新建的会话不受影响

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::resolver::SessionStore,
    error::AppError,
    models::{session::Session, user::User},
};

pub struct SessionRepository {
    db: PgPool,
}

impl SessionRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 创建会话（每次登录都插入新行，从不复用旧行）
    pub async fn create(
        &self,
        user_id: i64,
        expires_at: DateTime<Utc>,
        client_ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<Session, AppError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, user_id, expires_at, client_ip, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(expires_at)
        .bind(client_ip)
        .bind(user_agent)
        .fetch_one(&self.db)
        .await?;

        Ok(session)
    }

    /// 撤销单个会话（登出）
    pub async fn revoke(&self, session_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(session_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 批量撤销用户的全部活跃会话（账号停用时）
    pub async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }

    async fn load_user(&self, user_id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn find(&self, session_id: Uuid) -> Result<Option<(User, Session)>, AppError> {
        let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(session_id)
            .fetch_optional(&self.db)
            .await?;

        let Some(session) = session else {
            return Ok(None);
        };

        Ok(self.load_user(session.user_id).await?.map(|user| (user, session)))
    }

    async fn find_for_user(
        &self,
        session_id: Uuid,
        user_id: i64,
    ) -> Result<Option<(User, Session)>, AppError> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE id = $1 AND user_id = $2",
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        let Some(session) = session else {
            return Ok(None);
        };

        Ok(self.load_user(session.user_id).await?.map(|user| (user, session)))
    }
}
