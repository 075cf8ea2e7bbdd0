//! JWT token generation and validation
//! Bearer 令牌携带 {uid, sid, iat, exp}，HS256 签名

use crate::{config::AppConfig, error::AppError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id
    pub uid: i64,

    /// Session id
    pub sid: String,

    /// Issued at (Unix seconds)
    pub iat: i64,

    /// Expiration (Unix seconds)
    pub exp: i64,
}

/// JWT service
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expire_minutes: u64,
}

impl JwtService {
    /// Create JWT service from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.expose_secret();

        // HS256 密钥至少 32 字节
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expire_minutes: config.security.jwt_expire_minutes,
        })
    }

    /// 为 (用户, 会话) 签发令牌
    pub fn issue(&self, user_id: i64, session_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.expire_minutes as i64);

        let claims = Claims {
            uid: user_id,
            sid: session_id.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode token: {:?}", e);
            AppError::Internal
        })
    }

    /// 验证并解码令牌
    /// 签名错误、过期、缺失声明都映射为 Unauthorized —— 调用方（解析器）
    /// 将其视为"没有凭证"而非请求失败
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        Ok(
            decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
                .map_err(|e| {
                    tracing::debug!("Token validation failed: {:?}", e);
                    AppError::Unauthorized
                })?
                .claims,
        )
    }
}
