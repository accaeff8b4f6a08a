//! Database layer: pool, schema, and PostgreSQL-backed stores.

mod pool;
mod posts;
mod users;

pub use pool::{create_pool, init_schema, DbPool};
pub use posts::PgPostStore;
pub use users::PgUserStore;
