//! Storefront Engine
//!
//! The storefront engine holds the core logic of the storefront backend: turning requested line items into orders,
//! rewarding customers with loyalty points once their orders settle, and moving points between accounts.
//!
//! The library is divided into three main sections:
//! 1. The backend contracts ([`mod@traits`]) and the SQLite backend that implements them ([`SqliteDatabase`]). You
//!    should rarely need to talk to the database directly. The exception is the data types stored in the database,
//!    which are defined in the [`mod@db_types`] module and are public.
//! 2. The public API ([`mod@sf_api`]). [`OrderFlowApi`] runs the order lifecycle and deferred settlement,
//!    [`PointsApi`] performs peer-to-peer transfers, and [`AccountApi`] answers read-side queries.
//! 3. Test utilities, available with the `test_utils` feature.
pub mod db_types;
mod sf_api;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use sf_api::{
    accounts_api::AccountApi,
    order_flow_api::{OrderFlowApi, OrderFlowConfig},
    order_objects,
    points_api::PointsApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    AccountApiError,
    AccountManagement,
    CatalogManagement,
    SettlementResult,
    StorefrontDatabase,
    StorefrontError,
    TransferResult,
};
