//! 凭证解析器单元测试（内存会话存储，不依赖数据库）
//! 覆盖多来源优先级、静默回落和会话有效性规则

use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use authgate::auth::{jwt::JwtService, resolver::CredentialResolver};

mod common;
use common::{create_test_config, make_session, make_user, MemorySessionStore};

const COOKIE_NAME: &str = "sessionid";

fn jwt_service() -> Arc<JwtService> {
    Arc::new(JwtService::from_config(&create_test_config()).unwrap())
}

fn resolver(store: MemorySessionStore) -> CredentialResolver<MemorySessionStore> {
    CredentialResolver::new(store, jwt_service(), COOKIE_NAME.to_string())
}

fn headers_with_bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("authorization", format!("Bearer {}", token).parse().unwrap());
    headers
}

fn jar_with_session(session_id: Uuid) -> CookieJar {
    let mut headers = HeaderMap::new();
    headers.insert(
        "cookie",
        format!("{}={}", COOKIE_NAME, session_id).parse().unwrap(),
    );
    CookieJar::from_headers(&headers)
}

fn empty_jar() -> CookieJar {
    CookieJar::from_headers(&HeaderMap::new())
}

#[tokio::test]
async fn test_anonymous_request_resolves_to_none() {
    let resolver = resolver(MemorySessionStore::default());

    let principal = resolver.resolve(&HeaderMap::new(), &empty_jar()).await.unwrap();
    assert!(principal.is_none());
}

#[tokio::test]
async fn test_bearer_path_resolves_principal() {
    let user = make_user(1, true);
    let session = make_session(1, Duration::hours(1), None);
    let session_id = session.id;

    let jwt = jwt_service();
    let token = jwt.issue(1, session_id).unwrap();

    let resolver = resolver(MemorySessionStore::with(vec![(user, session)]));

    let principal = resolver
        .resolve(&headers_with_bearer(&token), &empty_jar())
        .await
        .unwrap()
        .expect("bearer path should resolve");

    assert_eq!(principal.user.id, 1);
    assert_eq!(principal.session.id, session_id);
}

#[tokio::test]
async fn test_cookie_path_resolves_principal() {
    let user = make_user(1, true);
    let session = make_session(1, Duration::hours(1), None);
    let session_id = session.id;

    let resolver = resolver(MemorySessionStore::with(vec![(user, session)]));

    let principal = resolver
        .resolve(&HeaderMap::new(), &jar_with_session(session_id))
        .await
        .unwrap()
        .expect("cookie path should resolve");

    assert_eq!(principal.session.id, session_id);
}

#[tokio::test]
async fn test_bearer_takes_precedence_over_cookie() {
    // 请求同时携带会话 A 的有效 bearer 与会话 B 的有效 cookie -> 返回 A
    let user_a = make_user(1, true);
    let session_a = make_session(1, Duration::hours(1), None);
    let session_a_id = session_a.id;

    let user_b = make_user(2, true);
    let session_b = make_session(2, Duration::hours(1), None);
    let session_b_id = session_b.id;

    let jwt = jwt_service();
    let token = jwt.issue(1, session_a_id).unwrap();

    let resolver = resolver(MemorySessionStore::with(vec![
        (user_a, session_a),
        (user_b, session_b),
    ]));

    let principal = resolver
        .resolve(&headers_with_bearer(&token), &jar_with_session(session_b_id))
        .await
        .unwrap()
        .expect("should resolve");

    assert_eq!(principal.user.id, 1);
    assert_eq!(principal.session.id, session_a_id);
}

#[tokio::test]
async fn test_malformed_bearer_falls_through_to_cookie() {
    // 篡改/格式错误的令牌视为"没有凭证"，cookie 仍然生效
    let user = make_user(2, true);
    let session = make_session(2, Duration::hours(1), None);
    let session_id = session.id;

    let resolver = resolver(MemorySessionStore::with(vec![(user, session)]));

    let principal = resolver
        .resolve(
            &headers_with_bearer("definitely-not-a-jwt"),
            &jar_with_session(session_id),
        )
        .await
        .unwrap()
        .expect("cookie should still resolve");

    assert_eq!(principal.user.id, 2);
}

#[tokio::test]
async fn test_bearer_with_unknown_session_falls_through() {
    let user = make_user(2, true);
    let session = make_session(2, Duration::hours(1), None);
    let session_id = session.id;

    // 合法签名，但指向不存在的会话
    let jwt = jwt_service();
    let token = jwt.issue(1, Uuid::new_v4()).unwrap();

    let resolver = resolver(MemorySessionStore::with(vec![(user, session)]));

    let principal = resolver
        .resolve(&headers_with_bearer(&token), &jar_with_session(session_id))
        .await
        .unwrap()
        .expect("cookie should still resolve");

    assert_eq!(principal.session.id, session_id);
}

#[tokio::test]
async fn test_bearer_uid_mismatch_is_rejected() {
    // 会话属于用户 1，令牌声称用户 999 -> bearer 路径不命中
    let user = make_user(1, true);
    let session = make_session(1, Duration::hours(1), None);
    let session_id = session.id;

    let jwt = jwt_service();
    let token = jwt.issue(999, session_id).unwrap();

    let resolver = resolver(MemorySessionStore::with(vec![(user, session)]));

    let principal = resolver
        .resolve(&headers_with_bearer(&token), &empty_jar())
        .await
        .unwrap();

    assert!(principal.is_none());
}

#[tokio::test]
async fn test_bearer_to_expired_session_falls_through_to_cookie() {
    // bearer 指向已过期会话，cookie 指向有效会话 -> 返回 cookie 的主体
    let user = make_user(1, true);
    let expired = make_session(1, Duration::hours(-1), None);
    let expired_id = expired.id;

    let live = make_session(1, Duration::hours(1), None);
    let live_id = live.id;

    let jwt = jwt_service();
    let token = jwt.issue(1, expired_id).unwrap();

    let resolver = resolver(MemorySessionStore::with(vec![
        (user.clone(), expired),
        (user, live),
    ]));

    let principal = resolver
        .resolve(&headers_with_bearer(&token), &jar_with_session(live_id))
        .await
        .unwrap()
        .expect("live cookie session should resolve");

    assert_eq!(principal.session.id, live_id);
}

#[tokio::test]
async fn test_expired_session_is_anonymous() {
    let user = make_user(1, true);
    let session = make_session(1, Duration::hours(-1), None);
    let session_id = session.id;

    let resolver = resolver(MemorySessionStore::with(vec![(user, session)]));

    let principal = resolver
        .resolve(&HeaderMap::new(), &jar_with_session(session_id))
        .await
        .unwrap();

    assert!(principal.is_none());
}

#[tokio::test]
async fn test_revoked_session_is_anonymous() {
    let user = make_user(1, true);
    let session = make_session(1, Duration::hours(1), Some(Utc::now()));
    let session_id = session.id;

    let resolver = resolver(MemorySessionStore::with(vec![(user, session)]));

    let principal = resolver
        .resolve(&HeaderMap::new(), &jar_with_session(session_id))
        .await
        .unwrap();

    assert!(principal.is_none());
}

#[tokio::test]
async fn test_inactive_user_session_is_anonymous() {
    // 未过期未撤销，但用户已停用 -> 两条路径都不命中
    let user = make_user(1, false);
    let session = make_session(1, Duration::hours(1), None);
    let session_id = session.id;

    let jwt = jwt_service();
    let token = jwt.issue(1, session_id).unwrap();

    let resolver = resolver(MemorySessionStore::with(vec![(user, session)]));

    let via_bearer = resolver
        .resolve(&headers_with_bearer(&token), &empty_jar())
        .await
        .unwrap();
    assert!(via_bearer.is_none());

    let via_cookie = resolver
        .resolve(&HeaderMap::new(), &jar_with_session(session_id))
        .await
        .unwrap();
    assert!(via_cookie.is_none());
}

#[tokio::test]
async fn test_cookie_with_garbage_value_is_anonymous() {
    let user = make_user(1, true);
    let session = make_session(1, Duration::hours(1), None);

    let resolver = resolver(MemorySessionStore::with(vec![(user, session)]));

    let mut headers = HeaderMap::new();
    headers.insert("cookie", format!("{}=not-a-uuid", COOKIE_NAME).parse().unwrap());
    let jar = CookieJar::from_headers(&headers);

    let principal = resolver.resolve(&HeaderMap::new(), &jar).await.unwrap();
    assert!(principal.is_none());
}
