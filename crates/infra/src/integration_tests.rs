//! Integration tests against a real Postgres database.
//!
//! Tests: Registration → ProductStore lookups → UserStore transaction → reload
//!
//! Verifies:
//! - Product name uniqueness is enforced by the database
//! - A failed registration leaves no user row and no join rows
//! - Interests reload in request order
//!
//! These are `#[ignore]`d by default. Run them with
//! `DATABASE_URL=postgres://... cargo test -p eoi-infra -- --ignored`.
//! Every test uses unique names/emails so the database does not need to be empty.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    use eoi_core::ProductId;
    use eoi_products::{NewProduct, Product};
    use eoi_users::{NewUser, Registration};

    use crate::config::DatabaseConfig;
    use crate::registration::{RegistrationError, RegistrationService};
    use crate::store::{PostgresStore, ProductStore, StoreError, UserStore};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    fn unique(label: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        format!("{label} {nanos}-{n}")
    }

    async fn setup() -> Arc<PostgresStore> {
        let config = DatabaseConfig::from_env().expect("database config");
        let store = PostgresStore::connect(&config)
            .await
            .expect("failed to connect to Postgres");
        store.ensure_schema().await.expect("failed to create schema");
        Arc::new(store)
    }

    async fn product(store: &PostgresStore, label: &str) -> Product {
        store
            .insert_product(NewProduct::new(unique(label)).unwrap())
            .await
            .unwrap()
    }

    async fn users_with_email(store: &PostgresStore, email: &str) -> usize {
        store
            .list_users()
            .await
            .unwrap()
            .iter()
            .filter(|u| u.email == email)
            .count()
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a scratch Postgres database"]
    async fn duplicate_product_name_is_rejected() {
        let store = setup().await;
        let name = unique("Unique Product");
        store
            .insert_product(NewProduct::new(name.clone()).unwrap())
            .await
            .unwrap();

        let err = store
            .insert_product(NewProduct::new(name.clone()).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a scratch Postgres database"]
    async fn seed_batch_with_duplicate_rolls_back() {
        let store = setup().await;
        let fresh = unique("Fresh");
        let existing = product(&store, "Existing").await;

        let err = store
            .insert_products(vec![
                NewProduct::new(fresh.clone()).unwrap(),
                NewProduct::new(existing.name.clone()).unwrap(),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
        assert!(store.find_product_by_name(&fresh).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a scratch Postgres database"]
    async fn registration_round_trips_with_ordered_interests() {
        let store = setup().await;
        let a = product(&store, "Product A").await;
        let b = product(&store, "Product B").await;
        let service = RegistrationService::new(store.clone(), store.clone());

        let email = unique("jane") + "@example.com";
        let details = service
            .register(Registration::new(
                "Jane Doe",
                email.clone(),
                "0987654321",
                "XY9 8ZT",
                [b.name.clone(), a.name.clone()],
            ))
            .await
            .unwrap();

        let loaded = store.get_user(details.id).await.unwrap().unwrap();
        assert_eq!(loaded.email, email);
        assert_eq!(loaded.interests, vec![b.clone(), a.clone()]);

        let interested = store.users_interested_in(a.id).await.unwrap();
        assert!(interested.iter().any(|u| u.id == details.id));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a scratch Postgres database"]
    async fn unknown_interest_name_persists_nothing() {
        let store = setup().await;
        let a = product(&store, "Product A").await;
        let service = RegistrationService::new(store.clone(), store.clone());

        let email = unique("ghost") + "@example.com";
        let err = service
            .register(Registration::new(
                "John Doe",
                email.clone(),
                "1234567890",
                "12345",
                [a.name.clone(), unique("Nonexistent")],
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::NotFound(_)));
        assert_eq!(users_with_email(&store, &email).await, 0);
        assert!(store.users_interested_in(a.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a scratch Postgres database"]
    async fn failing_join_row_rolls_back_user_row() {
        let store = setup().await;
        let a = product(&store, "Product A").await;
        let email = unique("rollback") + "@example.com";

        let err = store
            .save_user(NewUser {
                name: "Alice Smith".to_string(),
                email: email.clone(),
                mobile: "1122334455".to_string(),
                postcode: "LM4 5OP".to_string(),
                interests: vec![a, Product::new(ProductId::from_i64(i64::MAX), "Ghost")],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
        assert_eq!(users_with_email(&store, &email).await, 0);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a scratch Postgres database"]
    async fn user_without_interests_reloads_empty() {
        let store = setup().await;
        let service = RegistrationService::new(store.clone(), store.clone());

        let details = service
            .register(Registration::new(
                "Bob Jones",
                unique("bob") + "@example.com",
                "5566778899",
                "PQ3 4RS",
                Vec::<String>::new(),
            ))
            .await
            .unwrap();

        let loaded = store.get_user(details.id).await.unwrap().unwrap();
        assert!(loaded.interests.is_empty());
    }
}
