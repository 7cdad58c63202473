// Service exports
pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use store::{RelationshipStore, StoreError, StoreResult, StoreTransaction};
