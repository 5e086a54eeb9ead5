//! Users domain module.
//!
//! A user is created exactly once, by a successful registration, together with
//! the ordered list of products they are interested in. There is no update or
//! delete path.

pub mod registration;
pub mod user;

pub use registration::{Registration, RegistrationDetails};
pub use user::{NewUser, User};
