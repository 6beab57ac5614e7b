use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use serde_json::json;
use storefront_engine::{
    db_types::Role,
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        seed::{seed_deleted_product, seed_product, seed_user},
    },
    AccountApi,
};

use super::{
    helpers::{issue_token, send_json_request, store_routes},
    mocks::{samples, MockAccountManager},
};
use crate::routes::MyOrdersRoute;

fn configure(account_manager: MockAccountManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(web::Data::new(AccountApi::new(account_manager)))
            .service(MyOrdersRoute::<MockAccountManager>::new());
    }
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let mut account_manager = MockAccountManager::new();
    account_manager
        .expect_fetch_order_views_for_account()
        .withf(|id| *id == 4)
        .returning(|_| Ok(vec![samples::order_view(1, 4, "phone", 8_500_000, 2)]));
    let token = issue_token(4, Role::User);
    let (status, body) = send_json_request(TestRequest::get().uri("/order/me"), &token, configure(account_manager)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(
        body["data"],
        json!([{
            "id": 1,
            "email": "user4@example.com",
            "product": "phone",
            "image": "https://img.example/phone.png",
            "quantity": 2,
            "price": 8_500_000,
            "total": 17_000_000,
            "points": 170,
            "status": "pending",
            "createdAt": "2024-03-15T18:30:00Z"
        }])
    );
}

#[actix_web::test]
async fn place_single_item_order() {
    let db = prepare_test_env(&random_db_path()).await;
    let alice = seed_user(&db, "alice@example.com", 0).await;
    let phone = seed_product(&db, "phone", 8_500_000).await;
    let token = issue_token(alice.id, Role::User);

    let req = TestRequest::post().uri("/order").set_json(json!({"productId": phone.id, "quantity": 1}));
    let (status, body) = send_json_request(req, &token, store_routes(db.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["code"], 201);
    assert_eq!(body["data"]["orderCount"], 1);
    assert_eq!(body["data"]["pointsEarned"], 85);
    assert_eq!(body["data"]["status"], "pending");

    let (status, body) = send_json_request(TestRequest::get().uri("/order/me"), &token, store_routes(db.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body["data"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["product"], "phone");
    assert_eq!(orders[0]["status"], "pending");
}

#[actix_web::test]
async fn place_multi_item_order() {
    let db = prepare_test_env(&random_db_path()).await;
    let alice = seed_user(&db, "alice@example.com", 0).await;
    let phone = seed_product(&db, "phone", 8_500_000).await;
    let case = seed_product(&db, "case", 150_000).await;
    let token = issue_token(alice.id, Role::User);

    let items = json!({"items": [{"productId": phone.id, "quantity": 2}, {"productId": case.id, "quantity": 3}]});
    let req = TestRequest::post().uri("/order").set_json(items);
    let (status, body) = send_json_request(req, &token, store_routes(db.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["orderCount"], 2);
    assert_eq!(body["data"]["pointsEarned"], 174);
    assert_eq!(body["data"]["orderIds"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn invalid_items_are_rejected_with_details() {
    let db = prepare_test_env(&random_db_path()).await;
    let alice = seed_user(&db, "alice@example.com", 0).await;
    let phone = seed_product(&db, "phone", 8_500_000).await;
    let token = issue_token(alice.id, Role::User);

    let items = json!({"items": [{"productId": phone.id, "quantity": 1}, {"productId": phone.id, "quantity": 0}]});
    let req = TestRequest::post().uri("/order").set_json(items);
    let (status, body) = send_json_request(req, &token, store_routes(db.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    let details = body["details"].as_array().unwrap();
    assert_eq!(details.len(), 1);
    assert!(details[0].as_str().unwrap().contains("items[1].quantity"));

    let (_, body) = send_json_request(TestRequest::get().uri("/order/me"), &token, store_routes(db.clone())).await;
    assert_eq!(body["data"], json!([]));
}

#[actix_web::test]
async fn malformed_body_is_a_validation_error() {
    let db = prepare_test_env(&random_db_path()).await;
    let alice = seed_user(&db, "alice@example.com", 0).await;
    let token = issue_token(alice.id, Role::User);

    let req = TestRequest::post().uri("/order").set_json(json!({"items": "lots"}));
    let (status, body) = send_json_request(req, &token, store_routes(db.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request body");
    assert!(body["details"].is_array());
}

#[actix_web::test]
async fn unavailable_products_are_not_found() {
    let db = prepare_test_env(&random_db_path()).await;
    let alice = seed_user(&db, "alice@example.com", 0).await;
    let phone = seed_product(&db, "phone", 8_500_000).await;
    let old = seed_deleted_product(&db, "pager", 20_000).await;
    let token = issue_token(alice.id, Role::User);

    for product_id in [old.id, 9_999] {
        let items = json!({"items": [{"productId": phone.id, "quantity": 1}, {"productId": product_id, "quantity": 1}]});
        let req = TestRequest::post().uri("/order").set_json(items);
        let (status, _) = send_json_request(req, &token, store_routes(db.clone())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    let (_, body) = send_json_request(TestRequest::get().uri("/order/me"), &token, store_routes(db.clone())).await;
    assert_eq!(body["data"], json!([]));
}

#[actix_web::test]
async fn cancel_order_lifecycle() {
    let db = prepare_test_env(&random_db_path()).await;
    let alice = seed_user(&db, "alice@example.com", 0).await;
    let bob = seed_user(&db, "bob@example.com", 0).await;
    let phone = seed_product(&db, "phone", 8_500_000).await;
    let alice_token = issue_token(alice.id, Role::User);
    let bob_token = issue_token(bob.id, Role::User);

    let req = TestRequest::post().uri("/order").set_json(json!({"productId": phone.id, "quantity": 1}));
    let (_, body) = send_json_request(req, &alice_token, store_routes(db.clone())).await;
    let order_id = body["data"]["orderIds"][0].as_i64().unwrap();
    let path = format!("/order/{order_id}/cancel");

    // Someone else's order looks like a missing one
    let (status, _) = send_json_request(TestRequest::patch().uri(&path), &bob_token, store_routes(db.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) =
        send_json_request(TestRequest::patch().uri(&path), &alice_token, store_routes(db.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");

    let (status, body) =
        send_json_request(TestRequest::patch().uri(&path), &alice_token, store_routes(db.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("cancelled"));

    // Cancelled orders drop out of the listing
    let (_, body) =
        send_json_request(TestRequest::get().uri("/order/me"), &alice_token, store_routes(db.clone())).await;
    assert_eq!(body["data"], json!([]));
}

#[actix_web::test]
async fn cancel_with_a_bad_id() {
    let db = prepare_test_env(&random_db_path()).await;
    let alice = seed_user(&db, "alice@example.com", 0).await;
    let token = issue_token(alice.id, Role::User);

    let (status, body) =
        send_json_request(TestRequest::patch().uri("/order/abc/cancel"), &token, store_routes(db.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid path parameter");
    let (status, _) =
        send_json_request(TestRequest::patch().uri("/order/4242/cancel"), &token, store_routes(db.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
