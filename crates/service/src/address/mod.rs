pub mod redis_store;
pub mod service;
pub mod store;

pub use redis_store::RedisAddressStore;
pub use service::{phone_key, AddressService, KEY_PREFIX};
pub use store::{AddressStore, StoreError};
