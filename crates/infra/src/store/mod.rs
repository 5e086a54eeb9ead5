//! Persistence boundary for products, users and the interest relation.
//!
//! The traits describe capabilities the registration service consumes
//! (find-by-unique-name, transactional save) without any storage assumptions.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use r#trait::{ProductStore, StoreError, UserStore};
