use actix_web::{
    body::to_bytes,
    cookie::Cookie,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::Duration;
use log::debug;
use serde_json::Value;
use sf_common::Secret;
use storefront_engine::{db_types::Role, AccountApi, OrderFlowApi, OrderFlowConfig, PointsApi, SqliteDatabase};

use crate::{
    auth::{JwtClaims, TokenIssuer, TokenVerifier, TOKEN_COOKIE},
    config::AuthConfig,
    middleware::JwtMiddlewareFactory,
    routes::{
        health,
        AllOrdersRoute,
        CancelOrderRoute,
        CreateOrderRoute,
        MyAccountRoute,
        MyOrdersRoute,
        TransferPointsRoute,
    },
    server::{json_config, path_config},
};

// DO NOT re-use this secret anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig { jwt_secret: Secret::new("endpoint-test-secret-endpoint-test-secret-0123456789".to_string()) }
}

pub fn issue_token(id: i64, role: Role) -> String {
    TokenIssuer::new(&get_auth_config()).issue_token(JwtClaims { id, role }, None).expect("Failed to sign token")
}

pub fn expired_token(id: i64, role: Role) -> String {
    TokenIssuer::new(&get_auth_config())
        .issue_token(JwtClaims { id, role }, Some(Duration::minutes(-5)))
        .expect("Failed to sign token")
}

/// Sends `req` through an app laid out like the real server: `/health` in the open, everything `configure` registers
/// behind the JWT middleware. The token, if any, goes in the `token` cookie.
///
/// Errors raised by middleware are turned into responses the same way the server does it.
pub async fn send_request<F>(req: TestRequest, token: &str, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let req = if token.is_empty() { req } else { req.cookie(Cookie::new(TOKEN_COOKIE, token.to_string())) };
    let verifier = TokenVerifier::new(&get_auth_config());
    let app = App::new()
        .app_data(json_config())
        .app_data(path_config())
        .service(health)
        .service(web::scope("").wrap(JwtMiddlewareFactory::new(verifier)).configure(configure));
    let service = test::init_service(app).await;
    debug!("Making request");
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = to_bytes(res.into_body()).await.expect("Could not read error body");
            (status, String::from_utf8_lossy(&body).into_owned())
        },
    }
}

/// Like [`send_request`], for endpoints that answer with the JSON envelope.
pub async fn send_json_request<F>(req: TestRequest, token: &str, configure: F) -> (StatusCode, Value)
where F: FnOnce(&mut ServiceConfig) {
    let (status, body) = send_request(req, token, configure).await;
    let json = serde_json::from_str(&body).unwrap_or_else(|e| panic!("Response is not JSON ({e}): {body}"));
    (status, json)
}

/// Registers every authenticated route against a real SQLite store.
pub fn store_routes(db: SqliteDatabase) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(web::Data::new(OrderFlowApi::new(db.clone(), OrderFlowConfig::default())))
            .app_data(web::Data::new(PointsApi::new(db.clone())))
            .app_data(web::Data::new(AccountApi::new(db)))
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(AllOrdersRoute::<SqliteDatabase>::new())
            .service(CancelOrderRoute::<SqliteDatabase>::new())
            .service(TransferPointsRoute::<SqliteDatabase>::new())
            .service(MyAccountRoute::<SqliteDatabase>::new());
    }
}
