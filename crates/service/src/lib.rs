//! Service layer for phone → address records.
//! - `address::store` is the key-value client seam with its conditional writes.
//! - `address::service` validates input, derives keys and maps store results.
//! - Errors are typed in `errors::ServiceError` for the HTTP layer to translate.

pub mod address;
pub mod errors;
