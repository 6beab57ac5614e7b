use actix_web::{http::StatusCode, test::TestRequest};
use serde_json::json;
use storefront_engine::{
    db_types::Role,
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        seed::seed_user,
    },
};

use super::helpers::{issue_token, send_json_request, store_routes};

fn transfer(target_user_id: i64, point: i64) -> TestRequest {
    TestRequest::post().uri("/point/transfer").set_json(json!({"targetUserId": target_user_id, "point": point}))
}

#[actix_web::test]
async fn transfer_points_to_another_user() {
    let db = prepare_test_env(&random_db_path()).await;
    let alice = seed_user(&db, "alice@example.com", 100).await;
    let bob = seed_user(&db, "bob@example.com", 0).await;
    let token = issue_token(alice.id, Role::User);

    let (status, body) = send_json_request(transfer(bob.id, 40), &token, store_routes(db.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"targetUserId": bob.id, "point": 40, "remainingPoints": 60}));

    let bob_token = issue_token(bob.id, Role::User);
    let (status, body) =
        send_json_request(TestRequest::get().uri("/account/me"), &bob_token, store_routes(db.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["points"], 40);
}

#[actix_web::test]
async fn overdrawn_transfers_change_nothing() {
    let db = prepare_test_env(&random_db_path()).await;
    let alice = seed_user(&db, "alice@example.com", 100).await;
    let bob = seed_user(&db, "bob@example.com", 0).await;
    let token = issue_token(alice.id, Role::User);

    let (status, body) = send_json_request(transfer(bob.id, 150), &token, store_routes(db.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (_, body) = send_json_request(TestRequest::get().uri("/account/me"), &token, store_routes(db.clone())).await;
    assert_eq!(body["data"]["points"], 100);
}

#[actix_web::test]
async fn rejected_transfer_requests() {
    let db = prepare_test_env(&random_db_path()).await;
    let alice = seed_user(&db, "alice@example.com", 100).await;
    let token = issue_token(alice.id, Role::User);

    let (status, _) = send_json_request(transfer(alice.id, 10), &token, store_routes(db.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json_request(transfer(9_999, 10), &token, store_routes(db.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send_json_request(transfer(0, 0), &token, store_routes(db.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"].as_array().unwrap().len(), 2);

    let req = TestRequest::post().uri("/point/transfer").set_json(json!({"point": 10}));
    let (status, body) = send_json_request(req, &token, store_routes(db.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request body");

    let (_, body) = send_json_request(TestRequest::get().uri("/account/me"), &token, store_routes(db.clone())).await;
    assert_eq!(body["data"]["points"], 100);
}

#[actix_web::test]
async fn unknown_account_is_not_found() {
    let db = prepare_test_env(&random_db_path()).await;
    let token = issue_token(777, Role::User);
    let (status, body) = send_json_request(TestRequest::get().uri("/account/me"), &token, store_routes(db)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}
