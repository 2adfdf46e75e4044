pub mod db;
pub mod keys;
pub mod memory;
pub mod models;
pub mod schema;
pub mod store;

mod error;
mod pg_store;

pub use error::Error;
pub use store::{BoxFuture, ExtraFields, ForumStore, Intersect, Order, ScoreRange};

pub type Result<T, E = Error> = std::result::Result<T, E>;
