//! Registration pipeline (application-level orchestration).
//!
//! ```text
//! Registration { name, email, mobile, postcode, interests }
//!   ↓
//! 1. Resolve every interest name to a product (concurrent lookups)
//!   ↓   any name missing → NotFound, nothing written
//! 2. Build the unsaved user with the resolved products
//!   ↓
//! 3. Save user + join rows in one store transaction
//!   ↓   any failure → rolled back, error returned
//! 4. Return RegistrationDetails (identity + contact fields, no interests)
//! ```
//!
//! Lookups run concurrently but results are collected positionally, so the
//! persisted interest order always matches the request order regardless of
//! which lookup finishes first.
//!
//! This module contains no IO itself; it composes the store traits.

use futures::future::try_join_all;
use thiserror::Error;
use tracing::instrument;

use eoi_products::Product;
use eoi_users::{Registration, RegistrationDetails};

use crate::store::{ProductStore, StoreError, UserStore};

#[derive(Debug, Error)]
pub enum RegistrationError {
    /// An interest name did not match any product. Raised before any write.
    #[error("product not found: {0}")]
    NotFound(String),

    /// The save was rejected by a unique or referential constraint.
    #[error("registration rejected by a store constraint")]
    ConstraintViolation(#[source] StoreError),

    /// The save failed for any other reason and was rolled back.
    #[error("registration transaction failed")]
    TransactionFailure(#[source] StoreError),

    /// A product lookup failed (the store, not the name, was the problem).
    #[error("product lookup failed")]
    Lookup(#[source] StoreError),
}

impl RegistrationError {
    fn from_save(err: StoreError) -> Self {
        match err {
            StoreError::ConstraintViolation(_) => Self::ConstraintViolation(err),
            _ => Self::TransactionFailure(err),
        }
    }

    /// The underlying store error, if any.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::NotFound(_) => None,
            Self::ConstraintViolation(e) | Self::TransactionFailure(e) | Self::Lookup(e) => Some(e),
        }
    }
}

/// Registers users against an injected product store and user store.
///
/// ## Execution Guarantees
///
/// - **Resolution before write**: every lookup completes before the save starts
/// - **Atomicity**: the save is delegated to `UserStore::save_user`, which
///   commits the user and all join rows together or nothing
/// - **No recovery**: failures are returned unchanged in meaning, with the
///   original store error as the `source()`
///
/// ## Generic Parameters
///
/// - `P`: product lookups (`ProductStore`)
/// - `U`: transactional user save (`UserStore`)
///
/// Both are commonly the same `Arc`'d store.
#[derive(Debug, Clone)]
pub struct RegistrationService<P, U> {
    products: P,
    users: U,
}

impl<P, U> RegistrationService<P, U> {
    pub fn new(products: P, users: U) -> Self {
        Self { products, users }
    }

    pub fn products(&self) -> &P {
        &self.products
    }

    pub fn users(&self) -> &U {
        &self.users
    }
}

impl<P, U> RegistrationService<P, U>
where
    P: ProductStore,
    U: UserStore,
{
    /// Register a user with their product interests.
    ///
    /// Failures are returned, not logged; the caller decides how to report them.
    #[instrument(
        skip(self, registration),
        fields(interest_count = registration.interests.len())
    )]
    pub async fn register(
        &self,
        registration: Registration,
    ) -> Result<RegistrationDetails, RegistrationError> {
        let products = {
            let names = registration.interest_names();
            self.resolve_interests(&names).await?
        };

        let user = self
            .users
            .save_user(registration.into_new_user(products))
            .await
            .map_err(RegistrationError::from_save)?;

        tracing::info!(
            user_id = %user.id,
            interest_count = user.interests.len(),
            "user registered"
        );
        Ok(RegistrationDetails::from(user))
    }

    /// Resolve names to products, concurrently, preserving input order.
    ///
    /// Fails on the first name that matches nothing.
    pub async fn resolve_interests(&self, names: &[&str]) -> Result<Vec<Product>, RegistrationError> {
        let lookups = names.iter().map(|name| async move {
            match self.products.find_product_by_name(name).await {
                Ok(Some(product)) => Ok(product),
                Ok(None) => Err(RegistrationError::NotFound((*name).to_string())),
                Err(e) => Err(RegistrationError::Lookup(e)),
            }
        });
        try_join_all(lookups).await
    }
}
