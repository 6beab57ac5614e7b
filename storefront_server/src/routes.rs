//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every handler here awaits the database, so none of them block.
use actix_web::{get, http::StatusCode, web, HttpResponse, Responder};
use log::*;
use serde::Serialize;
use serde_json::json;
use storefront_engine::{
    db_types::Role,
    traits::{AccountManagement, StorefrontDatabase},
    AccountApi,
    OrderFlowApi,
    PointsApi,
};

use crate::{
    auth::JwtClaims,
    data_objects::{
        AccountSummary,
        JsonResponse,
        OrderCreated,
        OrderRequest,
        OrderSummary,
        TransferReceipt,
        TransferRequest,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $bound:path where requires [$($roles:expr),*]) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> B>)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where
            B: $bound + 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),*]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $bound:path) => {
        $crate::route!($name => $method $path impl $bound where requires []);
    };
}

fn respond<T: Serialize>(status: StatusCode, message: &str, data: &T) -> HttpResponse {
    let body = JsonResponse::success(status, message).with_data(data);
    HttpResponse::build(status).content_type("application/json").body(body.to_json())
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/order" impl StorefrontDatabase where requires [Role::User]);
/// Route handler for placing an order.
///
/// The body is either `{"items": [{"productId": 1, "quantity": 2}, ...]}` or a single `{"productId": 1, "quantity": 2}`.
/// Every item must refer to an available product. If any item is rejected, no orders are created.
///
/// The orders are created as `pending`, and the points they earn are credited once the batch settles. The response
/// reports the points the batch will earn, not the caller's new balance.
pub async fn create_order<B: StorefrontDatabase>(
    claims: JwtClaims,
    body: web::Json<OrderRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST order for account #{}", claims.id);
    let request = body.into_inner();
    request.validate().map_err(|details| ServerError::validation("Invalid order request", details))?;
    let result = api.create_order(claims.id, request.into_items()).await?;
    Ok(respond(StatusCode::CREATED, "Order placed", &OrderCreated::from(&result)))
}

route!(my_orders => Get "/order/me" impl AccountManagement where requires [Role::User]);
pub async fn my_orders<B: AccountManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET orders for account #{}", claims.id);
    let orders = api.orders_for_account(claims.id).await?;
    let orders = orders.into_iter().map(OrderSummary::from).collect::<Vec<_>>();
    Ok(respond(StatusCode::OK, "Orders retrieved", &orders))
}

route!(all_orders => Get "/order/allordered" impl AccountManagement where requires [Role::Admin]);
pub async fn all_orders<B: AccountManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET all orders for admin #{}", claims.id);
    let orders = api.all_orders().await?;
    let orders = orders.into_iter().map(OrderSummary::from).collect::<Vec<_>>();
    Ok(respond(StatusCode::OK, "Orders retrieved", &orders))
}

route!(cancel_order => Patch "/order/{id}/cancel" impl StorefrontDatabase where requires [Role::User]);
/// Cancels one of the caller's pending orders. Orders belonging to someone else are reported as not found.
pub async fn cancel_order<B: StorefrontDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ PATCH cancel order #{order_id} for account #{}", claims.id);
    let order = api.cancel_order(claims.id, order_id).await?;
    Ok(respond(StatusCode::OK, "Order cancelled", &json!({ "id": order.id, "status": order.status })))
}

//----------------------------------------------   Points  ----------------------------------------------------
route!(transfer_points => Post "/point/transfer" impl StorefrontDatabase where requires [Role::User]);
pub async fn transfer_points<B: StorefrontDatabase>(
    claims: JwtClaims,
    body: web::Json<TransferRequest>,
    api: web::Data<PointsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST transfer of {} points from #{} to #{}", request.point, claims.id, request.target_user_id);
    request.validate().map_err(|details| ServerError::validation("Invalid transfer request", details))?;
    let result = api.transfer(claims.id, request.target_user_id, request.point).await?;
    let receipt = TransferReceipt {
        target_user_id: result.target.id,
        point: result.amount.value(),
        remaining_points: result.sender.points.value(),
    };
    Ok(respond(StatusCode::OK, "Points transferred", &receipt))
}

//----------------------------------------------   Account  ----------------------------------------------------
route!(my_account => Get "/account/me" impl AccountManagement);
pub async fn my_account<B: AccountManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET account #{}", claims.id);
    let account = api
        .account_by_id(claims.id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("Account #{} does not exist", claims.id)))?;
    Ok(respond(StatusCode::OK, "Account retrieved", &AccountSummary::from(account)))
}
