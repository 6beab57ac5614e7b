use std::time::Duration;

use actix_web::{
    dev::Server,
    error::{JsonPayloadError, PathError},
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    Error,
    HttpRequest,
    HttpServer,
};
use log::*;
use storefront_engine::{AccountApi, OrderFlowApi, PointsApi, SqliteDatabase};

use crate::{
    auth::TokenVerifier,
    config::ServerConfig,
    errors::ServerError,
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
    settlement_worker::start_settlement_worker,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.auto_migrate {
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
        info!("🚀️ Database migrations are up to date");
    }
    let worker =
        start_settlement_worker(db.clone(), config.order_flow.clone(), config.settlement_poll_interval);
    let srv = create_server_instance(config, db)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    worker.abort();
    result
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), config.order_flow.clone());
        let points_api = PointsApi::new(db.clone());
        let accounts_api = AccountApi::new(db.clone());
        let verifier = TokenVerifier::new(&config.auth);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sf::access_log"))
            .app_data(json_config())
            .app_data(path_config())
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(points_api))
            .app_data(web::Data::new(accounts_api));
        // Routes that require authentication
        let auth_scope = web::scope("")
            .wrap(JwtMiddlewareFactory::new(verifier))
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(AllOrdersRoute::<SqliteDatabase>::new())
            .service(CancelOrderRoute::<SqliteDatabase>::new())
            .service(TransferPointsRoute::<SqliteDatabase>::new())
            .service(MyAccountRoute::<SqliteDatabase>::new());
        app.service(health).service(auth_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Malformed JSON bodies are reported in the usual error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| -> Error {
        debug!("💻️ Rejected request body. {err}");
        ServerError::validation("Invalid request body", vec![err.to_string()]).into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: PathError, _req: &HttpRequest| -> Error {
        debug!("💻️ Rejected path parameters. {err}");
        ServerError::validation("Invalid path parameter", vec![err.to_string()]).into()
    })
}
