use serde::{Deserialize, Serialize};

use eoi_core::{ProductId, UserId};
use eoi_products::Product;

/// A persisted user together with their interests.
///
/// `interests` is ordered by the position each product had in the registration
/// request, not by product id or insertion time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub postcode: String,
    pub interests: Vec<Product>,
}

impl User {
    pub fn is_interested_in(&self, product_id: ProductId) -> bool {
        self.interests.iter().any(|p| p.id == product_id)
    }
}

/// A user that has not been saved yet.
///
/// The interests must already be persisted products; the store writes one join
/// row per entry, in order, in the same transaction as the user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub postcode: String,
    pub interests: Vec<Product>,
}

impl NewUser {
    /// Attach the identity generated by the store.
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            mobile: self.mobile,
            postcode: self.postcode,
            interests: self.interests,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str) -> Product {
        Product::new(ProductId::from_i64(id), name)
    }

    #[test]
    fn into_user_keeps_fields_and_interest_order() {
        let new_user = NewUser {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            mobile: "0987654321".to_string(),
            postcode: "XY9 8ZT".to_string(),
            interests: vec![product(2, "Product B"), product(1, "Product A")],
        };

        let user = new_user.into_user(UserId::from_i64(10));
        assert_eq!(user.id, UserId::from_i64(10));
        assert_eq!(user.name, "Jane Doe");
        assert_eq!(user.postcode, "XY9 8ZT");
        let ids: Vec<ProductId> = user.interests.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![ProductId::from_i64(2), ProductId::from_i64(1)]);
        assert!(user.is_interested_in(ProductId::from_i64(1)));
        assert!(!user.is_interested_in(ProductId::from_i64(3)));
    }
}
