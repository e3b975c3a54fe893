//! MySQL backend. Queries are checked at runtime so the crate builds without
//! a live database; dynamic filters go through [`Conditions`](crate::utils::db_utils::Conditions).

mod holiday;
mod inventory;
mod ticket;
mod user;

use sqlx::MySqlPool;

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}
