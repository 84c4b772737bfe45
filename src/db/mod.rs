mod connection;
mod migrations;
mod queries;
pub mod seed;

pub use connection::Database;
