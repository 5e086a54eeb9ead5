use serde::{Deserialize, Serialize};

use eoi_core::{DomainError, DomainResult, ProductId};

/// Names of the demonstration products created by the seed operation.
pub const SEED_PRODUCT_NAMES: [&str; 3] = ["Delivery", "Pick-up", "Payment"];

/// A persisted product.
///
/// `name` is unique across all products and is the natural key used when
/// resolving a user's interests. The inverse side of the interest relation
/// (interested users) is not owned here; stores expose it as a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A product that has not been inserted yet (no identity assigned).
///
/// Only `new` and [`seed_catalogue`] construct one, so every instance has a
/// non-blank name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    name: String,
}

impl NewProduct {
    /// Names are stored verbatim; lookups are exact matches, so no trimming or
    /// case folding happens here.
    pub fn new(name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        Ok(Self { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_name(self) -> String {
        self.name
    }
}

/// The seed batch: one `NewProduct` per entry of [`SEED_PRODUCT_NAMES`].
pub fn seed_catalogue() -> Vec<NewProduct> {
    SEED_PRODUCT_NAMES
        .iter()
        .map(|name| NewProduct {
            name: (*name).to_string(),
        })
        .collect()
}
