use super::store::memory::MemorySessionStore;
use super::store::{SessionStore, persist};
use super::*;
use crate::web::mock::MockHttpClient;

// =========================================================
// 辅助函数
// =========================================================

const NOW: i64 = 1_800_000_000_000;
const SIGN_IN_URL: &str = "https://id.test/v1/accounts:signInWithPassword?key=k";
const SIGN_UP_URL: &str = "https://id.test/v1/accounts:signUp?key=k";
const TOKEN_URL: &str = "https://token.test/v1/token?key=k";

fn create_client() -> IdentityClient<MockHttpClient> {
    let config = IdentityConfig {
        api_key: "k".to_string(),
        auth_origin: "https://id.test".to_string(),
        token_origin: "https://token.test".to_string(),
    };
    IdentityClient::new(config, Duration::from_secs(5), MockHttpClient::new())
}

fn create_session(expires_at: i64) -> Session {
    Session {
        uid: "u1".to_string(),
        email: "ada@example.com".to_string(),
        display_name: None,
        id_token: "old-id".to_string(),
        refresh_token: "old-refresh".to_string(),
        expires_at,
    }
}

fn provider_error(message: &str) -> String {
    format!(r#"{{"error":{{"code":400,"message":"{}","errors":[]}}}}"#, message)
}

const PASSWORD_OK: &str = r#"{"localId":"u1","email":"ada@example.com","displayName":"",
    "idToken":"id-1","refreshToken":"refresh-1","expiresIn":"3600","registered":true}"#;

// =========================================================
// 登录 / 注册
// =========================================================

#[tokio::test]
async fn test_sign_in_builds_session() {
    let identity = create_client();
    identity
        .client
        .mock_response(HttpMethod::Post, SIGN_IN_URL, 200, PASSWORD_OK);

    let session = identity.sign_in(" ada@example.com ", "secret1", NOW).await.unwrap();

    assert_eq!(session.uid, "u1");
    assert_eq!(session.display_name, None);
    assert_eq!(session.id_token, "id-1");
    assert_eq!(session.expires_at, NOW + 3_600_000);

    let req = identity.client.last_request().unwrap();
    let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["returnSecureToken"], true);
    assert_eq!(req.header("Authorization"), None);
}

#[tokio::test]
async fn test_sign_up_maps_provider_codes() {
    let identity = create_client();
    identity.client.mock_response(
        HttpMethod::Post,
        SIGN_UP_URL,
        400,
        &provider_error("WEAK_PASSWORD : Password should be at least 6 characters"),
    );

    let err = identity.sign_up("ada@example.com", "12345", NOW).await.unwrap_err();

    assert_eq!(err.code(), Some(&AuthErrorCode::WeakPassword));
    assert!(err.code().unwrap().concerns_credentials());
    assert_eq!(err.user_message(), AuthErrorCode::WeakPassword.user_message());
}

#[tokio::test]
async fn test_invalid_credentials_share_one_message() {
    for code in ["EMAIL_NOT_FOUND", "INVALID_PASSWORD", "INVALID_LOGIN_CREDENTIALS"] {
        let identity = create_client();
        identity
            .client
            .mock_response(HttpMethod::Post, SIGN_IN_URL, 400, &provider_error(code));
        let err = identity.sign_in("ada@example.com", "secret1", NOW).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password.");
    }
}

#[tokio::test]
async fn test_transport_failure_is_not_a_provider_code() {
    let identity = create_client();
    identity.client.mock_error(
        HttpMethod::Post,
        SIGN_IN_URL,
        HttpError::NetworkError("offline".to_string()),
    );

    let err = identity.sign_in("ada@example.com", "secret1", NOW).await.unwrap_err();

    assert_eq!(err.code(), None);
    assert!(err.user_message().contains("connection"));
}

#[test]
fn test_error_code_parsing() {
    assert_eq!(AuthErrorCode::parse("EMAIL_EXISTS"), AuthErrorCode::EmailExists);
    assert_eq!(
        AuthErrorCode::parse("TOO_MANY_ATTEMPTS_TRY_LATER : Access disabled"),
        AuthErrorCode::TooManyAttempts
    );
    assert_eq!(
        AuthErrorCode::parse("OPERATION_NOT_ALLOWED"),
        AuthErrorCode::Other("OPERATION_NOT_ALLOWED".to_string())
    );
    assert!(!AuthErrorCode::InvalidCredentials.concerns_credentials());
}

// =========================================================
// 令牌刷新
// =========================================================

const REFRESH_OK: &str = r#"{"id_token":"id-2","refresh_token":"refresh-2","expires_in":"3600",
    "user_id":"u1","token_type":"Bearer","project_id":"1"}"#;

#[tokio::test]
async fn test_fresh_token_reuses_valid_token() {
    let identity = create_client();
    let session = create_session(NOW + 10 * 60_000);

    let (token, renewed) = identity.fresh_token(&session, NOW).await.unwrap();

    assert_eq!(token, "old-id");
    assert!(renewed.is_none());
    assert_eq!(identity.client.request_count(), 0);
}

#[tokio::test]
async fn test_fresh_token_refreshes_near_expiry() {
    let identity = create_client();
    identity
        .client
        .mock_response(HttpMethod::Post, TOKEN_URL, 200, REFRESH_OK);
    let session = create_session(NOW + 30_000);

    let (token, renewed) = identity.fresh_token(&session, NOW).await.unwrap();

    assert_eq!(token, "id-2");
    let renewed = renewed.unwrap();
    assert_eq!(renewed.refresh_token, "refresh-2");
    assert_eq!(renewed.email, session.email);
    assert_eq!(renewed.expires_at, NOW + 3_600_000);

    let req = identity.client.last_request().unwrap();
    let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["grant_type"], "refresh_token");
    assert_eq!(body["refresh_token"], "old-refresh");
}

#[tokio::test]
async fn test_refresh_for_other_user_is_rejected() {
    let identity = create_client();
    identity.client.mock_response(
        HttpMethod::Post,
        TOKEN_URL,
        200,
        &REFRESH_OK.replace("\"u1\"", "\"u2\""),
    );

    let err = identity.refresh(&create_session(NOW), NOW).await.unwrap_err();
    assert!(matches!(err, AuthError::Decode(_)));
}

#[tokio::test]
async fn test_restore_drops_session_when_refresh_is_rejected() {
    let identity = create_client();
    identity.client.mock_response(
        HttpMethod::Post,
        TOKEN_URL,
        400,
        &provider_error("TOKEN_EXPIRED"),
    );

    assert_eq!(identity.restore(Some(create_session(NOW - 1)), NOW).await, None);
    assert_eq!(identity.restore(None, NOW).await, None);
}

#[tokio::test]
async fn test_restore_keeps_valid_session_without_network() {
    let identity = create_client();
    let session = create_session(NOW + 3_600_000);

    assert_eq!(identity.restore(Some(session.clone()), NOW).await, Some(session));
    assert_eq!(identity.client.request_count(), 0);
}

#[test]
fn test_persist_saves_and_clears() {
    let store = MemorySessionStore::default();
    let session = create_session(NOW);

    persist(&store, Some(&session));
    assert_eq!(store.load(), Some(session));

    persist(&store, None);
    assert_eq!(store.load(), None);
}

#[test]
fn test_session_label_prefers_display_name() {
    let mut session = create_session(NOW);
    assert_eq!(session.label(), "ada@example.com");
    session.display_name = Some("Ada".to_string());
    assert_eq!(session.label(), "Ada");
}
