//! Storage backends implementing [`crate::core::PersistencePort`].

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
