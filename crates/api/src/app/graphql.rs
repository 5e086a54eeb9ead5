//! GraphQL schema: the registration mutation plus the product/user read surface.
//!
//! Failures carry the same machine-readable `code` as the REST error body, in
//! the error's `extensions`.

use std::sync::Arc;

use async_graphql::{
    Context, EmptySubscription, ErrorExtensions, InputObject, Object, Result, Schema, SimpleObject,
};

use eoi_core::{ProductId, UserId};
use eoi_infra::{RegistrationError, StoreError};
use eoi_products::NewProduct;
use eoi_users::{Registration, RegistrationDetails};

use crate::app::errors;
use crate::app::services::AppServices;

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(services: Arc<AppServices>) -> AppSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(services)
        .finish()
}

fn services<'a>(ctx: &'a Context<'_>) -> Result<&'a Arc<AppServices>> {
    ctx.data::<Arc<AppServices>>()
}

fn coded_error(code: &'static str, message: impl Into<String>) -> async_graphql::Error {
    async_graphql::Error::new(message.into()).extend_with(|_, e| e.set("code", code))
}

fn store_error(err: StoreError) -> async_graphql::Error {
    let (status, code) = errors::store_error_status(&err);
    errors::log_failure(status, code, &err);
    coded_error(code, err.to_string())
}

fn registration_error(err: RegistrationError) -> async_graphql::Error {
    let (status, code) = errors::registration_error_status(&err);
    errors::log_failure(status, code, &err);
    coded_error(code, errors::message_with_cause(&err))
}

// -------------------------
// Input / payload types
// -------------------------

#[derive(Debug, InputObject)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub postcode: String,
    #[graphql(default)]
    pub interests: Vec<String>,
}

impl From<RegisterInput> for Registration {
    fn from(input: RegisterInput) -> Self {
        Registration::new(input.name, input.email, input.mobile, input.postcode, input.interests)
    }
}

#[derive(Debug, InputObject)]
pub struct CreateProductInput {
    pub name: String,
}

/// Result of `register`: the new user's identity and contact fields.
#[derive(Debug, SimpleObject)]
pub struct RegisterPayload {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub postcode: String,
}

impl From<RegistrationDetails> for RegisterPayload {
    fn from(details: RegistrationDetails) -> Self {
        Self {
            id: details.id.as_i64(),
            name: details.name,
            email: details.email,
            mobile: details.mobile,
            postcode: details.postcode,
        }
    }
}

// -------------------------
// Object types
// -------------------------

pub struct Product(eoi_products::Product);

#[Object]
impl Product {
    async fn id(&self) -> i64 {
        self.0.id.as_i64()
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    /// Users that listed this product among their interests.
    async fn interested_users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let users = services(ctx)?
            .users()
            .users_interested_in(self.0.id)
            .await
            .map_err(store_error)?;
        Ok(users.into_iter().map(User).collect())
    }
}

pub struct User(eoi_users::User);

#[Object]
impl User {
    async fn id(&self) -> i64 {
        self.0.id.as_i64()
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn email(&self) -> &str {
        &self.0.email
    }

    async fn mobile(&self) -> &str {
        &self.0.mobile
    }

    async fn postcode(&self) -> &str {
        &self.0.postcode
    }

    /// Products in the order they were given at registration.
    async fn interests(&self) -> Vec<Product> {
        self.0.interests.iter().cloned().map(Product).collect()
    }
}

// -------------------------
// Roots
// -------------------------

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn products(&self, ctx: &Context<'_>) -> Result<Vec<Product>> {
        let products = services(ctx)?
            .products()
            .list_products()
            .await
            .map_err(store_error)?;
        Ok(products.into_iter().map(Product).collect())
    }

    async fn product(&self, ctx: &Context<'_>, id: i64) -> Result<Option<Product>> {
        let product = services(ctx)?
            .products()
            .get_product(ProductId::from_i64(id))
            .await
            .map_err(store_error)?;
        Ok(product.map(Product))
    }

    async fn product_by_name(&self, ctx: &Context<'_>, name: String) -> Result<Option<Product>> {
        let product = services(ctx)?
            .products()
            .find_product_by_name(&name)
            .await
            .map_err(store_error)?;
        Ok(product.map(Product))
    }

    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let users = services(ctx)?
            .users()
            .list_users()
            .await
            .map_err(store_error)?;
        Ok(users.into_iter().map(User).collect())
    }

    async fn user(&self, ctx: &Context<'_>, id: i64) -> Result<Option<User>> {
        let user = services(ctx)?
            .users()
            .get_user(UserId::from_i64(id))
            .await
            .map_err(store_error)?;
        Ok(user.map(User))
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Register a user against existing products, atomically.
    async fn register(&self, ctx: &Context<'_>, input: RegisterInput) -> Result<RegisterPayload> {
        let details = services(ctx)?
            .registration()
            .register(input.into())
            .await
            .map_err(registration_error)?;
        Ok(details.into())
    }

    async fn create_product(&self, ctx: &Context<'_>, input: CreateProductInput) -> Result<Product> {
        let new_product = NewProduct::new(input.name).map_err(|e| {
            let (_, code) = errors::domain_error_status(&e);
            coded_error(code, e.to_string())
        })?;
        let product = services(ctx)?
            .products()
            .insert_product(new_product)
            .await
            .map_err(store_error)?;
        Ok(Product(product))
    }
}
