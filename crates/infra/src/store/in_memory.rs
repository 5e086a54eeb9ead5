use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use eoi_core::{ProductId, UserId};
use eoi_products::{NewProduct, Product};
use eoi_users::{NewUser, User};

use super::r#trait::{ProductStore, StoreError, UserStore};

#[derive(Debug, Clone)]
struct UserRow {
    name: String,
    email: String,
    mobile: String,
    postcode: String,
}

#[derive(Debug, Default)]
struct State {
    products: BTreeMap<ProductId, Product>,
    product_names: HashMap<String, ProductId>,
    users: BTreeMap<UserId, UserRow>,
    /// Join rows per user, in registration order.
    interests: HashMap<UserId, Vec<ProductId>>,
    last_product_id: i64,
    last_user_id: i64,
}

impl State {
    fn load_user(&self, id: UserId) -> Option<User> {
        let row = self.users.get(&id)?;
        let interests = self
            .interests
            .get(&id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|pid| self.products.get(pid).cloned())
                    .collect()
            })
            .unwrap_or_default();

        Some(User {
            id,
            name: row.name.clone(),
            email: row.email.clone(),
            mobile: row.mobile.clone(),
            postcode: row.postcode.clone(),
            interests,
        })
    }

    /// Reject a batch that would break name uniqueness, before anything is written.
    fn check_new_names<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<(), StoreError> {
        let mut batch = HashSet::new();
        for name in names {
            if self.product_names.contains_key(name) || !batch.insert(name) {
                return Err(StoreError::ConstraintViolation(format!(
                    "duplicate product name '{name}'"
                )));
            }
        }
        Ok(())
    }

    fn push_product(&mut self, product: NewProduct) -> Product {
        self.last_product_id += 1;
        let id = ProductId::from_i64(self.last_product_id);
        let product = Product::new(id, product.into_name());
        self.product_names.insert(product.name.clone(), id);
        self.products.insert(id, product.clone());
        product
    }
}

/// In-memory store implementing both product and user persistence.
///
/// Intended for tests/dev. Every write validates all constraints before
/// mutating anything, under a single write lock, which gives the same
/// all-or-nothing visibility as a database transaction.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut state = self.write()?;
        state.check_new_names([product.name()])?;
        Ok(state.push_product(product))
    }

    async fn insert_products(&self, products: Vec<NewProduct>) -> Result<Vec<Product>, StoreError> {
        let mut state = self.write()?;
        state.check_new_names(products.iter().map(NewProduct::name))?;
        Ok(products.into_iter().map(|p| state.push_product(p)).collect())
    }

    async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        let state = self.read()?;
        Ok(state
            .product_names
            .get(name)
            .and_then(|id| state.products.get(id))
            .cloned())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.read()?.products.values().cloned().collect())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn save_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut state = self.write()?;

        // Referential + join-key checks first; nothing is written if any fails.
        let mut seen = HashSet::with_capacity(user.interests.len());
        for product in &user.interests {
            if !state.products.contains_key(&product.id) {
                return Err(StoreError::ConstraintViolation(format!(
                    "interest references unknown product {}",
                    product.id
                )));
            }
            if !seen.insert(product.id) {
                return Err(StoreError::ConstraintViolation(format!(
                    "duplicate interest in product {}",
                    product.id
                )));
            }
        }

        state.last_user_id += 1;
        let id = UserId::from_i64(state.last_user_id);
        state.users.insert(
            id,
            UserRow {
                name: user.name.clone(),
                email: user.email.clone(),
                mobile: user.mobile.clone(),
                postcode: user.postcode.clone(),
            },
        );
        state
            .interests
            .insert(id, user.interests.iter().map(|p| p.id).collect());

        // Echo the stored product rows, not whatever the caller passed in.
        let stored = state.load_user(id).unwrap_or_else(|| user.into_user(id));
        Ok(stored)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.load_user(id))
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let state = self.read()?;
        Ok(state
            .users
            .keys()
            .filter_map(|id| state.load_user(*id))
            .collect())
    }

    async fn users_interested_in(&self, product_id: ProductId) -> Result<Vec<User>, StoreError> {
        let state = self.read()?;
        Ok(state
            .users
            .keys()
            .filter_map(|id| state.load_user(*id))
            .filter(|user| user.is_interested_in(product_id))
            .collect())
    }
}
