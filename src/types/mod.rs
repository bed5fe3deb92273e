//! Data carried by a checkout request.

mod credentials;
mod custom_fields;
mod customer;
mod order;

pub use credentials::*;
pub use custom_fields::*;
pub use customer::*;
pub use order::*;
