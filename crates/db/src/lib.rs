pub mod connection;
pub mod repositories;
pub mod schema;

pub use connection::{connect, connect_with_settings, DbPool};
