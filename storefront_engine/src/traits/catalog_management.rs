use crate::{db_types::Product, traits::AccountApiError};

/// Read access to the product catalog. Catalog maintenance lives outside the engine; the order flow only needs to
/// resolve the products an order refers to.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Fetches the product with the given id, including soft-deleted products. Callers decide what to do with
    /// unavailable products using [`Product::is_available`].
    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, AccountApiError>;
}
