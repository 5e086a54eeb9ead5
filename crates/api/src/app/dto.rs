use serde_json::json;

use eoi_products::Product;
use eoi_users::{RegistrationDetails, User};

// -------------------------
// Response mapping
// -------------------------

pub fn product_to_json(product: &Product) -> serde_json::Value {
    json!({
        "id": product.id.as_i64(),
        "name": product.name,
    })
}

pub fn products_to_json(products: &[Product]) -> serde_json::Value {
    json!({ "items": products.iter().map(product_to_json).collect::<Vec<_>>() })
}

/// Product plus the users interested in it (contact fields only).
pub fn product_detail_to_json(product: &Product, interested: &[User]) -> serde_json::Value {
    json!({
        "id": product.id.as_i64(),
        "name": product.name,
        "interested_users": interested.iter().map(user_summary_to_json).collect::<Vec<_>>(),
    })
}

pub fn registration_to_json(details: &RegistrationDetails) -> serde_json::Value {
    json!({
        "id": details.id.as_i64(),
        "name": details.name,
        "email": details.email,
        "mobile": details.mobile,
        "postcode": details.postcode,
    })
}

pub fn user_summary_to_json(user: &User) -> serde_json::Value {
    registration_to_json(&RegistrationDetails::from(user))
}

/// User with interests in registration order.
pub fn user_to_json(user: &User) -> serde_json::Value {
    json!({
        "id": user.id.as_i64(),
        "name": user.name,
        "email": user.email,
        "mobile": user.mobile,
        "postcode": user.postcode,
        "interests": user.interests.iter().map(product_to_json).collect::<Vec<_>>(),
    })
}

pub fn users_to_json(users: &[User]) -> serde_json::Value {
    json!({ "items": users.iter().map(user_to_json).collect::<Vec<_>>() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use eoi_core::{ProductId, UserId};

    fn user() -> User {
        User {
            id: UserId::from_i64(7),
            name: "John Doe".into(),
            email: "john@example.com".into(),
            mobile: "1234567890".into(),
            postcode: "12345".into(),
            interests: vec![
                Product::new(ProductId::from_i64(2), "Pick-up"),
                Product::new(ProductId::from_i64(1), "Delivery"),
            ],
        }
    }

    #[test]
    fn summary_omits_interests() {
        let v = user_summary_to_json(&user());
        assert_eq!(v["id"], 7);
        assert!(v.get("interests").is_none());
    }

    #[test]
    fn user_keeps_interest_order() {
        let v = user_to_json(&user());
        let names: Vec<_> = v["interests"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Pick-up", "Delivery"]);
    }
}
