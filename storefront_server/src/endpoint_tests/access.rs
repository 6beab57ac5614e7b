use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use sf_common::Secret;
use storefront_engine::{db_types::Role, AccountApi};

use super::{
    helpers::{expired_token, issue_token, send_json_request, send_request},
    mocks::{samples, MockAccountManager},
};
use crate::{
    auth::{JwtClaims, TokenIssuer},
    config::AuthConfig,
    routes::{AllOrdersRoute, MyAccountRoute, MyOrdersRoute},
};

fn configure(account_manager: MockAccountManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(web::Data::new(AccountApi::new(account_manager)))
            .service(MyOrdersRoute::<MockAccountManager>::new())
            .service(AllOrdersRoute::<MockAccountManager>::new())
            .service(MyAccountRoute::<MockAccountManager>::new());
    }
}

#[actix_web::test]
async fn health_needs_no_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(TestRequest::get().uri("/health"), "", |_| {}).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn missing_token_is_unauthorized() {
    let _ = env_logger::try_init().ok();
    let mut account_manager = MockAccountManager::new();
    account_manager.expect_fetch_order_views_for_account().never();
    let (status, body) = send_json_request(TestRequest::get().uri("/order/me"), "", configure(account_manager)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], 401);
}

#[actix_web::test]
async fn token_from_another_issuer_is_unauthorized() {
    let _ = env_logger::try_init().ok();
    let config = AuthConfig { jwt_secret: Secret::new("not-the-server-secret-not-the-server-secret".to_string()) };
    let token = TokenIssuer::new(&config).issue_token(JwtClaims { id: 1, role: Role::User }, None).unwrap();
    let (status, _) =
        send_json_request(TestRequest::get().uri("/order/me"), &token, configure(MockAccountManager::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn expired_token_is_unauthorized() {
    let _ = env_logger::try_init().ok();
    let token = expired_token(1, Role::User);
    let (status, body) =
        send_json_request(TestRequest::get().uri("/order/me"), &token, configure(MockAccountManager::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].as_str().unwrap().contains("expired"));
}

#[actix_web::test]
async fn bearer_header_is_accepted() {
    let _ = env_logger::try_init().ok();
    let mut account_manager = MockAccountManager::new();
    account_manager.expect_fetch_order_views_for_account().withf(|id| *id == 1).returning(|_| Ok(vec![]));
    let token = issue_token(1, Role::User);
    let req = TestRequest::get().uri("/order/me").insert_header(("Authorization", format!("Bearer {token}")));
    let (status, body) = send_json_request(req, "", configure(account_manager)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], serde_json::json!([]));
}

#[actix_web::test]
async fn users_cannot_list_every_order() {
    let _ = env_logger::try_init().ok();
    let mut account_manager = MockAccountManager::new();
    account_manager.expect_fetch_all_order_views().never();
    let token = issue_token(1, Role::User);
    let (status, body) =
        send_json_request(TestRequest::get().uri("/order/allordered"), &token, configure(account_manager)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 403);
}

#[actix_web::test]
async fn admins_list_every_order() {
    let _ = env_logger::try_init().ok();
    let mut account_manager = MockAccountManager::new();
    account_manager.expect_fetch_all_order_views().returning(|| {
        Ok(vec![samples::order_view(2, 5, "case", 150_000, 3), samples::order_view(1, 4, "phone", 8_500_000, 1)])
    });
    let token = issue_token(9, Role::Admin);
    let (status, body) =
        send_json_request(TestRequest::get().uri("/order/allordered"), &token, configure(account_manager)).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body["data"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["email"], "user5@example.com");
    assert_eq!(orders[1]["product"], "phone");
    assert_eq!(orders[1]["points"], 85);
}

#[actix_web::test]
async fn any_role_can_read_its_own_account() {
    let _ = env_logger::try_init().ok();
    let mut account_manager = MockAccountManager::new();
    account_manager
        .expect_fetch_user_account()
        .withf(|id| *id == 9)
        .returning(|id| Ok(Some(samples::account(id, Role::Admin, 0))));
    let token = issue_token(9, Role::Admin);
    let (status, body) =
        send_json_request(TestRequest::get().uri("/account/me"), &token, configure(account_manager)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "admin");
    assert_eq!(body["data"]["email"], "user9@example.com");
}
