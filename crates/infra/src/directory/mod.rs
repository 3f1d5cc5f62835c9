//! `AccountDirectory` implementations.

mod in_memory;
mod postgres;

pub use in_memory::InMemoryAccountDirectory;
pub use postgres::PostgresAccountDirectory;
