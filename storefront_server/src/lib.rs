//! # Storefront server
//! This crate hosts the HTTP server for the storefront backend. It is responsible for:
//! * Authenticating requests with the JWT issued by the login service, and enforcing per-route roles.
//! * Turning order, cancellation and point transfer requests into calls on the storefront engine.
//! * Running the settlement worker that confirms due order batches and credits their points.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `GET /health`: A health check route that returns a 200 OK response.
//! * `POST /order`: Place an order for one or more products.
//! * `GET /order/me`: The caller's orders.
//! * `GET /order/allordered`: Every order (admin only).
//! * `PATCH /order/{id}/cancel`: Cancel a pending order.
//! * `POST /point/transfer`: Send points to another user.
//! * `GET /account/me`: The caller's account and point balance.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod settlement_worker;

#[cfg(test)]
mod endpoint_tests;
