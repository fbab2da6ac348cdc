pub mod errors;
pub mod pool;
pub mod repositories;
pub mod schema;

pub use errors::{DbError, DbResult};
pub use pool::{create_memory_pool, create_pool};
pub use schema::migrate;
