//! Schema types for the phone → address records.
//! - `PhoneNumber` is the record identifier and the source of the store key.
//! - `Address` is the persisted value; validation runs before any store access.

pub mod address;
pub mod errors;
pub mod phone;

pub use address::Address;
pub use errors::ModelError;
pub use phone::PhoneNumber;
