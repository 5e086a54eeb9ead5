//! Postgres-backed store implementation.
//!
//! Three tables back the data model:
//!
//! - `product (id BIGSERIAL, name TEXT UNIQUE)`
//! - `"user" (id BIGSERIAL, name, email, mobile, postcode)`
//! - `user_interests_product (user_id, product_id, position)`, keyed by
//!   `(user_id, product_id)`; `position` preserves the request order
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `ConstraintViolation` | Duplicate product name or duplicate interest |
//! | Database (foreign key violation) | `23503` | `ConstraintViolation` | Interest references a missing product |
//! | Database (not null violation) | `23502` | `ConstraintViolation` | Missing required column |
//! | Database (check constraint violation) | `23514` | `ConstraintViolation` | Invalid data |
//! | Database (other) | Any other | `Transaction` | Serialization failures, etc. |
//! | PoolClosed / PoolTimedOut / Io | N/A | `Unavailable` | Connectivity loss |
//! | Other | N/A | `Transaction` | Decode errors, protocol errors |
//!
//! ## Thread Safety
//!
//! `PostgresStore` is `Send + Sync` and can be shared across request handlers.
//! All operations use the SQLx connection pool.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{instrument, Span};

use eoi_core::{ProductId, UserId};
use eoi_products::{NewProduct, Product};
use eoi_users::{NewUser, User};

use super::r#trait::{ProductStore, StoreError, UserStore};
use crate::config::DatabaseConfig;

const SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS product (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        CONSTRAINT product_name_key UNIQUE (name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "user" (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        mobile TEXT NOT NULL,
        postcode TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_interests_product (
        user_id BIGINT NOT NULL REFERENCES "user" (id) ON DELETE CASCADE,
        product_id BIGINT NOT NULL REFERENCES product (id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        PRIMARY KEY (user_id, product_id)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS user_interests_product_product_id_idx
        ON user_interests_product (product_id)
    "#,
];

/// Postgres-backed store for products, users and the interest join.
///
/// ## Transactions
///
/// `save_user` and `insert_products` each run inside one transaction. The
/// transaction is committed only after every row is written; on any error the
/// `Transaction` handle is dropped, which rolls it back.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    /// Create a new PostgresStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool from configuration and verify connectivity.
    #[instrument(skip(config), err)]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the tables if they do not exist yet.
    ///
    /// Idempotent; safe to run on every start.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }

    async fn insert_product_tx(
        tx: &mut Transaction<'_, Postgres>,
        product: NewProduct,
    ) -> Result<Product, StoreError> {
        let row = sqlx::query("INSERT INTO product (name) VALUES ($1) RETURNING id, name")
            .bind(product.name())
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("insert_product", e))?;
        product_from_row(&row)
    }

    /// Attach interests (in position order) to already-loaded user rows.
    async fn attach_interests(&self, rows: Vec<UserRow>) -> Result<Vec<User>, StoreError> {
        if rows.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let interest_rows = sqlx::query(
            r#"
            SELECT
                uip.user_id,
                p.id,
                p.name
            FROM user_interests_product uip
            JOIN product p ON p.id = uip.product_id
            WHERE uip.user_id = ANY($1)
            ORDER BY uip.user_id ASC, uip.position ASC
            "#,
        )
        .bind(ids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_interests", e))?;

        let mut by_user: HashMap<i64, Vec<Product>> = HashMap::with_capacity(rows.len());
        for row in &interest_rows {
            let user_id: i64 = row
                .try_get("user_id")
                .map_err(|e| map_sqlx_error("load_interests", e))?;
            by_user.entry(user_id).or_default().push(product_from_row(row)?);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let interests = by_user.remove(&row.id).unwrap_or_default();
                row.into_user(interests)
            })
            .collect())
    }
}

#[async_trait]
impl ProductStore for PostgresStore {
    #[instrument(skip(self, product))]
    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        let product = Self::insert_product_tx(&mut tx, product).await?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;
        Ok(product)
    }

    #[instrument(skip(self, products), fields(product_count = products.len()))]
    async fn insert_products(&self, products: Vec<NewProduct>) -> Result<Vec<Product>, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let mut inserted = Vec::with_capacity(products.len());
        for product in products {
            inserted.push(Self::insert_product_tx(&mut tx, product).await?);
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;
        Ok(inserted)
    }

    #[instrument(skip(self))]
    async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT id, name FROM product WHERE name = $1")
            .bind(name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_product_by_name", e))?;
        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT id, name FROM product WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?;
        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self), fields(product_count))]
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query("SELECT id, name FROM product ORDER BY id ASC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;

        let products = rows.iter().map(product_from_row).collect::<Result<Vec<_>, _>>()?;
        Span::current().record("product_count", products.len());
        Ok(products)
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    #[instrument(
        skip(self, user),
        fields(interest_count = user.interests.len(), user_id)
    )]
    async fn save_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO "user" (name, email, mobile, postcode)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.mobile)
        .bind(&user.postcode)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;

        for (position, product) in user.interests.iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| StoreError::ConstraintViolation("too many interests".to_string()))?;
            sqlx::query(
                r#"
                INSERT INTO user_interests_product (user_id, product_id, position)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(id)
            .bind(product.id.as_i64())
            .bind(position)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_interest", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        Span::current().record("user_id", id);
        Ok(user.into_user(UserId::from_i64(id)))
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"SELECT id, name, email, mobile, postcode FROM "user" WHERE id = $1"#,
        )
        .bind(id.as_i64())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_user", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let user_row = UserRow::from_pg_row(&row)?;
        Ok(self.attach_interests(vec![user_row]).await?.pop())
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query(
            r#"SELECT id, name, email, mobile, postcode FROM "user" ORDER BY id ASC"#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_users", e))?;

        let user_rows = rows.iter().map(UserRow::from_pg_row).collect::<Result<Vec<_>, _>>()?;
        self.attach_interests(user_rows).await
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn users_interested_in(&self, product_id: ProductId) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                u.id,
                u.name,
                u.email,
                u.mobile,
                u.postcode
            FROM "user" u
            JOIN user_interests_product uip ON uip.user_id = u.id
            WHERE uip.product_id = $1
            ORDER BY u.id ASC
            "#,
        )
        .bind(product_id.as_i64())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("users_interested_in", e))?;

        let user_rows = rows.iter().map(UserRow::from_pg_row).collect::<Result<Vec<_>, _>>()?;
        self.attach_interests(user_rows).await
    }
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());

            match db_err.code().as_deref() {
                Some("23505") | Some("23503") | Some("23502") | Some("23514") => {
                    StoreError::ConstraintViolation(msg)
                }
                _ => StoreError::Transaction(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("timed out acquiring a connection in {}", operation))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("io error in {}: {}", operation, e)),
        _ => StoreError::Transaction(format!("sqlx error in {}: {}", operation, err)),
    }
}

// SQLx row types

fn product_from_row(row: &sqlx::postgres::PgRow) -> Result<Product, StoreError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| map_sqlx_error("decode_product", e))?;
    let name: String = row
        .try_get("name")
        .map_err(|e| map_sqlx_error("decode_product", e))?;
    Ok(Product::new(ProductId::from_i64(id), name))
}

#[derive(Debug)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    mobile: String,
    postcode: String,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for UserRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            mobile: row.try_get("mobile")?,
            postcode: row.try_get("postcode")?,
        })
    }
}

impl UserRow {
    fn from_pg_row(row: &sqlx::postgres::PgRow) -> Result<Self, StoreError> {
        <UserRow as sqlx::FromRow<'_, sqlx::postgres::PgRow>>::from_row(row)
            .map_err(|e| map_sqlx_error("decode_user", e))
    }

    fn into_user(self, interests: Vec<Product>) -> User {
        User {
            id: UserId::from_i64(self.id),
            name: self.name,
            email: self.email,
            mobile: self.mobile,
            postcode: self.postcode,
            interests,
        }
    }
}
