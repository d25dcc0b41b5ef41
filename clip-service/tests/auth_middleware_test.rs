//! Bearer-token middleware behavior over a real actix application.
//!
//! No database involved: the probe route just echoes the identity the
//! middleware extracted.
use actix_web::{http::StatusCode, test, web, App, HttpResponse};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use clip_service::config::AuthConfig;
use clip_service::middleware::{AuthMiddleware, AuthenticatedUser};
use clip_service::security::token::{Claims, TokenKeys};

const SECRET: &str = "integration-secret";

fn token_keys() -> Arc<TokenKeys> {
    Arc::new(TokenKeys::new(&AuthConfig {
        jwt_secret: SECRET.to_string(),
        token_ttl_secs: 3600,
    }))
}

async fn whoami(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "id": user.id,
        "username": user.username,
    }))
}

macro_rules! protected_app {
    ($keys:expr) => {
        test::init_service(
            App::new().service(
                web::scope("/api")
                    .wrap(AuthMiddleware::new($keys))
                    .route("/whoami", web::get().to(whoami)),
            ),
        )
        .await
    };
}

/// Middleware failures surface as errors before the handler runs; resolve
/// either outcome to a status code.
macro_rules! status_of {
    ($app:expr, $req:expr) => {
        match test::try_call_service(&$app, $req).await {
            Ok(resp) => resp.status(),
            Err(e) => e.as_response_error().status_code(),
        }
    };
}

#[actix_web::test]
async fn test_missing_token_is_rejected() {
    let app = protected_app!(token_keys());
    let req = test::TestRequest::get().uri("/api/whoami").to_request();
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_non_bearer_scheme_is_rejected() {
    let app = protected_app!(token_keys());
    let req = test::TestRequest::get()
        .uri("/api/whoami")
        .insert_header(("Authorization", "Basic abc123"))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_garbage_token_is_rejected() {
    let app = protected_app!(token_keys());
    let req = test::TestRequest::get()
        .uri("/api/whoami")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_expired_token_is_rejected_despite_valid_signature() {
    let keys = token_keys();
    let app = protected_app!(keys.clone());

    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        username: "alice".to_string(),
        iat: now - 7200,
        exp: now - 3600,
    };
    let stale = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let req = test::TestRequest::get()
        .uri("/api/whoami")
        .insert_header(("Authorization", format!("Bearer {stale}")))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_valid_token_reaches_handler_with_identity() {
    let keys = token_keys();
    let app = protected_app!(keys.clone());

    let user_id = Uuid::new_v4();
    let token = keys.issue(user_id, "alice").unwrap();

    let req = test::TestRequest::get()
        .uri("/api/whoami")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], user_id.to_string());
    assert_eq!(body["username"], "alice");
}

#[actix_web::test]
async fn test_token_from_other_secret_is_rejected() {
    let app = protected_app!(token_keys());

    let other = TokenKeys::new(&AuthConfig {
        jwt_secret: "some-other-secret".to_string(),
        token_ttl_secs: 3600,
    });
    let token = other.issue(Uuid::new_v4(), "mallory").unwrap();

    let req = test::TestRequest::get()
        .uri("/api/whoami")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);
}
