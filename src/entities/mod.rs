//! Listing domain entities

pub mod macros;
pub mod owner;
pub mod property;

pub use owner::{Owner, OwnerPayload};
pub use property::{Property, PropertyPayload};
