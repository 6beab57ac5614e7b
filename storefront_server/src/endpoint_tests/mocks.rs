use mockall::mock;
use storefront_engine::{
    db_types::{Order, OrderBatch, OrderView, UserAccount},
    traits::{AccountApiError, AccountManagement},
};

mock! {
    pub AccountManager {}
    impl AccountManagement for AccountManager {
        async fn fetch_user_account(&self, account_id: i64) -> Result<Option<UserAccount>, AccountApiError>;
        async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, AccountApiError>;
        async fn fetch_order_views_for_account(&self, account_id: i64) -> Result<Vec<OrderView>, AccountApiError>;
        async fn fetch_all_order_views(&self) -> Result<Vec<OrderView>, AccountApiError>;
        async fn fetch_orders_for_batch(&self, batch_id: i64) -> Result<Vec<Order>, AccountApiError>;
        async fn fetch_batch(&self, batch_id: i64) -> Result<Option<OrderBatch>, AccountApiError>;
    }
}

pub mod samples {
    use chrono::{TimeZone, Utc};
    use storefront_engine::db_types::{Money, OrderStatusType, OrderView, Points, Role, UserAccount};

    pub fn account(id: i64, role: Role, points: i64) -> UserAccount {
        UserAccount {
            id,
            email: format!("user{id}@example.com"),
            role,
            points: Points::from(points),
            created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        }
    }

    pub fn order_view(id: i64, account_id: i64, product: &str, price: i64, quantity: i64) -> OrderView {
        OrderView {
            id,
            account_id,
            email: format!("user{account_id}@example.com"),
            product_id: id * 10,
            product: product.to_string(),
            image: Some(format!("https://img.example/{product}.png")),
            quantity,
            price: Money::from(price),
            total: Money::from(price * quantity),
            points: Points::from(price * quantity / 100_000),
            status: OrderStatusType::Pending,
            created_at: Utc.with_ymd_and_hms(2024, 3, 15, 18, 30, 0).unwrap(),
        }
    }
}
