//! # Backend contracts
//!
//! This module defines the behaviour a database backend must expose in order to drive the storefront engine.
//!
//! ## Accounts and orders
//! An account owns a point balance and any number of orders. Orders are created in batches, one batch per order
//! request, and each batch doubles as the durable settlement job for its orders.
//!
//! ## Traits
//! * [`StorefrontDatabase`] is the highest level of behaviour: atomic batch creation, cancellation, settlement and
//!   point transfers. Every method that mutates more than one row does so in a single transaction.
//! * [`AccountManagement`] provides read-only queries over accounts, orders and batches.
//! * [`CatalogManagement`] resolves products referenced by order requests.
mod account_management;
mod catalog_management;
mod data_objects;
mod storefront_database;

pub use account_management::{AccountApiError, AccountManagement};
pub use catalog_management::CatalogManagement;
pub use data_objects::{SettlementResult, TransferResult};
pub use storefront_database::{StorefrontDatabase, StorefrontError};
