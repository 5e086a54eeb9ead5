//! Products domain module.
//!
//! Products are the catalogue a user can express interest in. They are created
//! administratively (or by the seed operation) and are read-only from the
//! registration path's point of view.

pub mod product;

pub use product::{NewProduct, Product, SEED_PRODUCT_NAMES, seed_catalogue};
