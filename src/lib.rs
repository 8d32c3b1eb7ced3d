//! Talk-show guest ratings: episodes, guests and the rated appearances
//! linking them, stored in sqlite and served over HTTP.

pub mod config;
pub mod database;
pub mod errors;
pub mod interface;
pub mod models;
pub mod schema;
pub mod sources;
pub mod store;

pub use database::Database;
pub use errors::{ApiError, DataError};
