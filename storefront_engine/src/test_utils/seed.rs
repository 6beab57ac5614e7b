use crate::{
    db_types::{Money, NewProduct, Points, Product, Role, UserAccount},
    SqliteDatabase,
};

pub async fn seed_user(db: &SqliteDatabase, email: &str, points: i64) -> UserAccount {
    db.create_account(email, Role::User, Points::from(points)).await.expect("Error creating user account")
}

pub async fn seed_admin(db: &SqliteDatabase, email: &str) -> UserAccount {
    db.create_account(email, Role::Admin, Points::default()).await.expect("Error creating admin account")
}

pub async fn seed_product(db: &SqliteDatabase, name: &str, price: i64) -> Product {
    let product = NewProduct::new(name, Money::from(price)).with_image(format!("https://img.example/{name}.png"));
    db.create_product(product).await.expect("Error creating product")
}

/// Creates a product and immediately soft-deletes it.
pub async fn seed_deleted_product(db: &SqliteDatabase, name: &str, price: i64) -> Product {
    let product = seed_product(db, name, price).await;
    assert!(db.soft_delete_product(product.id).await.expect("Error deleting product"));
    product
}
