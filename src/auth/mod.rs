//! Authentication module：凭证原语与请求级解析

pub mod jwt;
pub mod password;
pub mod resolver;

pub use jwt::{Claims, JwtService};
pub use password::PasswordHasher;
pub use resolver::{authentication_middleware, bearer_token, CredentialResolver, SessionStore};
