use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
pub use sf_common::{AmountConversionError, Money, PointRate, Points};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid value for {0}: {1}")]
pub struct ConversionError(&'static str, String);

//--------------------------------------        Role         ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            s => Err(ConversionError("role", s.to_string())),
        }
    }
}

//--------------------------------------     UserAccount     ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub points: Points,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       Product       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Money,
    pub image: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker. Deleted products stay in the table so that historical orders still resolve.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn is_available(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    pub image: Option<String>,
    pub description: Option<String>,
}

impl NewProduct {
    pub fn new<S: Into<String>>(name: S, price: Money) -> Self {
        Self { name: name.into(), price, image: None, description: None }
    }

    pub fn with_image<S: Into<String>>(mut self, image: S) -> Self {
        self.image = Some(image.into());
        self
    }
}

//--------------------------------------   OrderStatusType   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The order has been placed and is waiting for its batch to settle.
    Pending,
    /// The batch settled and the order's points were credited. Terminal.
    Success,
    /// The owner cancelled the order before it settled. Terminal.
    Cancelled,
}

impl OrderStatusType {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatusType::Pending)
    }

    /// The only legal moves are `pending → success` and `pending → cancelled`.
    pub fn can_transition_to(&self, next: OrderStatusType) -> bool {
        !self.is_terminal() && next.is_terminal()
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "pending"),
            OrderStatusType::Success => write!(f, "success"),
            OrderStatusType::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError("order status", s.to_string())),
        }
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub batch_id: i64,
    pub account_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price x quantity, captured when the order was placed.
    pub total: Money,
    /// Points this order earns when it settles.
    pub points: Points,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub product_id: i64,
    pub quantity: i64,
    pub total: Money,
    pub points: Points,
}

//--------------------------------------      LineItem       ---------------------------------------------------------
/// A single `{productId, quantity}` entry of an order request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: i64,
    pub quantity: i64,
}

impl LineItem {
    pub fn new(product_id: i64, quantity: i64) -> Self {
        Self { product_id, quantity }
    }
}

//--------------------------------------      OrderView      ---------------------------------------------------------
/// An order joined with its product and owner, as shown in order listings.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderView {
    pub id: i64,
    pub account_id: i64,
    pub email: String,
    pub product_id: i64,
    pub product: String,
    pub image: Option<String>,
    pub quantity: i64,
    pub price: Money,
    pub total: Money,
    pub points: Points,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------   SettlementStatus  ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    /// Waiting for `due_at`, or for a retry after a failed attempt.
    Scheduled,
    /// At least one order moved to `success` and its points were credited.
    Settled,
    /// Every order in the batch was cancelled before settlement ran.
    Void,
    /// Settlement failed too many times. The orders remain `pending`.
    Failed,
}

impl Display for SettlementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettlementStatus::Scheduled => write!(f, "scheduled"),
            SettlementStatus::Settled => write!(f, "settled"),
            SettlementStatus::Void => write!(f, "void"),
            SettlementStatus::Failed => write!(f, "failed"),
        }
    }
}

//--------------------------------------     OrderBatch      ---------------------------------------------------------
/// The durable settlement job for the orders created by one order request.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderBatch {
    pub id: i64,
    pub account_id: i64,
    pub total_points: Points,
    pub credited_points: Points,
    pub status: SettlementStatus,
    /// Unix timestamp (seconds) after which the worker may settle the batch.
    pub due_at: i64,
    pub attempts: i64,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrderBatch {
    pub account_id: i64,
    pub due_at: DateTime<Utc>,
    pub orders: Vec<NewOrder>,
}

impl NewOrderBatch {
    /// The points the batch earns if none of its orders are cancelled.
    pub fn total_points(&self) -> Result<Points, AmountConversionError> {
        Points::checked_sum(self.orders.iter().map(|o| o.points))
    }
}
