//! Registration input and output shapes.

use serde::{Deserialize, Serialize};

use eoi_core::UserId;
use eoi_products::Product;

use crate::user::{NewUser, User};

/// A registration request: contact details plus the names of the products the
/// user is interested in.
///
/// The four contact fields are required but otherwise unvalidated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub postcode: String,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl Registration {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        mobile: impl Into<String>,
        postcode: impl Into<String>,
        interests: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            mobile: mobile.into(),
            postcode: postcode.into(),
            interests: interests.into_iter().map(Into::into).collect(),
        }
    }

    /// Interest names in request order with repeats collapsed to their first
    /// occurrence.
    pub fn interest_names(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::with_capacity(self.interests.len());
        self.interests
            .iter()
            .map(String::as_str)
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Build the unsaved user from this request and the resolved products.
    ///
    /// `products` must be in the same order as [`Registration::interest_names`].
    pub fn into_new_user(self, products: Vec<Product>) -> NewUser {
        NewUser {
            name: self.name,
            email: self.email,
            mobile: self.mobile,
            postcode: self.postcode,
            interests: products,
        }
    }
}

/// What a successful registration returns to the caller.
///
/// The resolved interests are deliberately not part of this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationDetails {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub postcode: String,
}

impl From<&User> for RegistrationDetails {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            mobile: user.mobile.clone(),
            postcode: user.postcode.clone(),
        }
    }
}

impl From<User> for RegistrationDetails {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            mobile: user.mobile,
            postcode: user.postcode,
        }
    }
}
