//! Session domain models
//! 会话的有效性规则：未撤销、未过期、且所属用户处于激活状态

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::User;

/// 持久化的登录会话
/// 过期是隐式的（基于时间），撤销是显式的（写入 revoked_at）；两者都是终态
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
}

impl Session {
    /// 会话行本身是否存活（不含用户状态；完整有效性见 Principal::is_valid）
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

/// 请求解析出的已认证主体：用户 + 会话
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
    pub session: Session,
}

impl Principal {
    /// 完整的会话有效性判定
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.session.is_live(now) && self.user.is_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_session(expires_in: Duration, revoked: bool) -> Session {
        let now = Utc::now();
        Session {
            id: Uuid::new_v4(),
            user_id: 1,
            created_at: now,
            expires_at: now + expires_in,
            revoked_at: if revoked { Some(now) } else { None },
            client_ip: None,
            user_agent: None,
        }
    }

    fn test_user(is_active: bool) -> User {
        let now = Utc::now();
        User {
            id: 1,
            full_name: "Test".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "hash".to_string(),
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_live_session() {
        let session = test_session(Duration::hours(1), false);
        assert!(session.is_live(Utc::now()));
    }

    #[test]
    fn test_expired_session_is_never_live() {
        // 已过期的会话即使 revoked_at 为空也无效
        let session = test_session(Duration::hours(-1), false);
        assert!(!session.is_live(Utc::now()));
    }

    #[test]
    fn test_revoked_session_is_never_live() {
        let session = test_session(Duration::hours(1), true);
        assert!(!session.is_live(Utc::now()));
    }

    #[test]
    fn test_principal_of_inactive_user_is_invalid() {
        // 未过期未撤销，但用户已停用
        let principal = Principal {
            user: test_user(false),
            session: test_session(Duration::hours(1), false),
        };
        assert!(!principal.is_valid(Utc::now()));
    }

    #[test]
    fn test_principal_of_active_user_is_valid() {
        let principal = Principal {
            user: test_user(true),
            session: test_session(Duration::hours(1), false),
        };
        assert!(principal.is_valid(Utc::now()));
    }
}
