//! Auth surface tests that run without a configured OAuth app and
//! without network access: the disabled login path, the callback
//! failure policy, and logout.

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{web, App};

use shortgate::services::auth::auth_routes;
use shortgate::session::SessionService;
use shortgate::storage::StorageFactory;

macro_rules! auth_app {
    () => {{
        test::init_service(
            App::new()
                .app_data(web::Data::new(StorageFactory::memory()))
                .app_data(web::Data::new(SessionService::new("auth-test", 3600)))
                .service(auth_routes()),
        )
        .await
    }};
}

#[actix_web::test]
async fn test_login_404_when_oauth_unconfigured() {
    let app = auth_app!();

    // No client id/secret in the default test environment.
    let req = TestRequest::get().uri("/auth/github").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_callback_without_params_redirects_home() {
    let app = auth_app!();

    let req = TestRequest::get().uri("/auth/github/callback").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    let location = resp.headers().get("Location").unwrap().to_str().unwrap();
    assert_eq!(location, "/");
}

#[actix_web::test]
async fn test_callback_with_state_mismatch_redirects_home() {
    let app = auth_app!();

    // A state parameter with no matching cookie fails the forgery check
    // before any outbound call is attempted.
    let req = TestRequest::get()
        .uri("/auth/github/callback?code=abc&state=xyz")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    let location = resp.headers().get("Location").unwrap().to_str().unwrap();
    assert_eq!(location, "/");
}

#[actix_web::test]
async fn test_logout_clears_session_cookie() {
    let app = auth_app!();

    let req = TestRequest::get().uri("/auth/logout").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    let set_cookie = resp
        .headers()
        .get("Set-Cookie")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("sg_session="));
    assert!(set_cookie.contains("Max-Age=0"));
}
