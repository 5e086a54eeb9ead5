use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use eoi_core::{ProductId, UserId};
use eoi_products::{NewProduct, Product};
use eoi_users::{NewUser, User};

/// Store operation error.
///
/// These are **infrastructure errors** as opposed to domain errors. A lookup
/// that matches nothing is not an error at this layer; it returns `Ok(None)`.
///
/// ## Error Categories
///
/// - **ConstraintViolation**: unique or referential constraint rejected a write
///   (duplicate product name, unknown product in a user's interests)
/// - **Transaction**: a write failed for any other reason and was rolled back
/// - **Unavailable**: the store could not be reached (pool closed, timeout, IO)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("transaction failed: {0}")]
    Transaction(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Product persistence.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a single product. Duplicate names fail with `ConstraintViolation`.
    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError>;

    /// Insert several products atomically: either every product is created or none.
    async fn insert_products(&self, products: Vec<NewProduct>) -> Result<Vec<Product>, StoreError>;

    /// Exact-match lookup on the unique name. At most one row can match.
    async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, StoreError>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// All products, ordered by id.
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
}

/// User persistence (owner of the interest join).
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a user and one join row per interest in a single transaction.
    ///
    /// On any failure nothing is visible afterwards: no user row, no join rows.
    async fn save_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Load a user with interests in their registration order.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// All users with interests, ordered by id.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Inverse side of the relation: users interested in a product, ordered by id.
    async fn users_interested_in(&self, product_id: ProductId) -> Result<Vec<User>, StoreError>;
}

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        (**self).insert_product(product).await
    }

    async fn insert_products(&self, products: Vec<NewProduct>) -> Result<Vec<Product>, StoreError> {
        (**self).insert_products(products).await
    }

    async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        (**self).find_product_by_name(name).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get_product(id).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list_products().await
    }
}

#[async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn save_user(&self, user: NewUser) -> Result<User, StoreError> {
        (**self).save_user(user).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).get_user(id).await
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        (**self).list_users().await
    }

    async fn users_interested_in(&self, product_id: ProductId) -> Result<Vec<User>, StoreError> {
        (**self).users_interested_in(product_id).await
    }
}
