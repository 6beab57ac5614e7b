use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use storefront_engine::{
    db_types::{LineItem, OrderStatusType, OrderView, Role, UserAccount},
    order_objects::OrderBatchResult,
};

//--------------------------------------      Envelope       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Every response body has the shape `{status, code, message, data?|details?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub status: ResponseStatus,
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl JsonResponse {
    pub fn success<S: Into<String>>(code: StatusCode, message: S) -> Self {
        Self { status: ResponseStatus::Success, code: code.as_u16(), message: message.into(), data: None, details: None }
    }

    pub fn error<S: Into<String>>(code: StatusCode, message: S, details: Option<Vec<String>>) -> Self {
        Self { status: ResponseStatus::Error, code: code.as_u16(), message: message.into(), data: None, details }
    }

    pub fn with_data<T: Serialize>(mut self, data: &T) -> Self {
        self.data = serde_json::to_value(data).ok();
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"status":"error","code":500,"message":"Internal server error"}"#.into())
    }
}

//--------------------------------------    Order requests   ---------------------------------------------------------
/// The body of `POST /order`. Either a list of items, or one bare item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderRequest {
    Batch { items: Vec<LineItem> },
    Single(LineItem),
}

impl OrderRequest {
    pub fn into_items(self) -> Vec<LineItem> {
        match self {
            OrderRequest::Batch { items } => items,
            OrderRequest::Single(item) => vec![item],
        }
    }

    /// Returns every problem with the request, not just the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let items = match self {
            OrderRequest::Batch { items } => items.as_slice(),
            OrderRequest::Single(item) => std::slice::from_ref(item),
        };
        let mut errors = vec![];
        if items.is_empty() {
            errors.push("\"items\" must contain at least 1 item".to_string());
        }
        for (i, item) in items.iter().enumerate() {
            if item.product_id < 1 {
                errors.push(format!("\"items[{i}].productId\" must be a positive number"));
            }
            if item.quantity < 1 {
                errors.push(format!("\"items[{i}].quantity\" must be greater than or equal to 1"));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub batch_id: i64,
    pub order_count: usize,
    pub points_earned: i64,
    pub status: OrderStatusType,
    pub order_ids: Vec<i64>,
}

impl From<&OrderBatchResult> for OrderCreated {
    fn from(result: &OrderBatchResult) -> Self {
        Self {
            batch_id: result.batch.id,
            order_count: result.order_count(),
            points_earned: result.total_points.value(),
            status: OrderStatusType::Pending,
            order_ids: result.orders.iter().map(|o| o.id).collect(),
        }
    }
}

/// One row of an order listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: i64,
    pub email: String,
    pub product: String,
    pub image: Option<String>,
    pub quantity: i64,
    pub price: i64,
    pub total: i64,
    pub points: i64,
    pub status: OrderStatusType,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<OrderView> for OrderSummary {
    fn from(view: OrderView) -> Self {
        Self {
            id: view.id,
            email: view.email,
            product: view.product,
            image: view.image,
            quantity: view.quantity,
            price: view.price.value(),
            total: view.total.value(),
            points: view.points.value(),
            status: view.status,
            created_at: view.created_at,
        }
    }
}

//--------------------------------------   Point transfers   ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub target_user_id: i64,
    pub point: i64,
}

impl TransferRequest {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = vec![];
        if self.target_user_id < 1 {
            errors.push("\"targetUserId\" must be a positive number".to_string());
        }
        if self.point < 1 {
            errors.push("\"point\" must be greater than or equal to 1".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    pub target_user_id: i64,
    pub point: i64,
    pub remaining_points: i64,
}

//--------------------------------------       Accounts      ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub points: i64,
}

impl From<UserAccount> for AccountSummary {
    fn from(account: UserAccount) -> Self {
        Self { id: account.id, email: account.email, role: account.role, points: account.points.value() }
    }
}
