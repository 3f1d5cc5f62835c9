//! Infrastructure layer: account storage, configuration, seeding.

pub mod config;
pub mod directory;
pub mod seed;

pub use config::AppConfig;
pub use directory::{InMemoryAccountDirectory, PostgresAccountDirectory};
