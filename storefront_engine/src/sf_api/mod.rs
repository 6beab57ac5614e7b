//! # Storefront engine public API
//!
//! The `sf_api` module exposes the programmatic API for the storefront engine. The API is modular, so that clients can
//! pick the functionality they need.
//!
//! * [`order_flow_api`] turns order requests into batches of `pending` orders, guards cancellation, and settles due
//!   batches, crediting the earned points exactly once.
//! * [`points_api`] moves points between accounts.
//! * [`accounts_api`] provides read-only access to accounts and order listings.
//!
//! # API usage
//!
//! Every API is created by supplying a backend that implements the traits the API needs:
//!
//! ```rust,ignore
//! use storefront_engine::{OrderFlowApi, OrderFlowConfig, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = OrderFlowApi::new(db, OrderFlowConfig::default());
//! let result = api.create_order(account_id, vec![LineItem::new(1, 2)]).await?;
//! ```
pub mod accounts_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod points_api;
