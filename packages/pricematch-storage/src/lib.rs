pub mod cache;
pub mod db;
pub mod listings;
pub mod models;
pub mod schema;
pub mod vendors;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
