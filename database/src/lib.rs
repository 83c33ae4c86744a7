use async_trait::async_trait;
use model::{
    list::{ListId, ShoppingList},
    update::{ListUpdate, UpdateEffect},
    user::UserId,
};
use sqlx::{
    pool::PoolConnection,
    postgres::{PgPool, PgPoolOptions},
    Postgres,
};
use std::{fmt::Display, marker::PhantomData, time};

#[macro_use]
extern crate log;

mod list;
mod memory;
mod user;

pub use list::*;
pub use memory::*;
pub use user::*;

pub type DatabaseResult<T> = Result<T, DatabaseError>;

const MAX_CONNECTIONS: u32 = 5;

/// Persistent storage of shopping lists.
///
/// Every method is a single store call. `update_list` applies one targeted
/// change atomically and never rewrites a whole collection.
#[async_trait]
pub trait ListStore: Send + Sync {
    async fn find_list(&self, id: &ListId) -> DatabaseResult<Option<ShoppingList>>;

    async fn find_lists_by_owner(&self, owner: &UserId) -> DatabaseResult<Vec<ShoppingList>>;

    async fn create_list(&self, list: &ShoppingList) -> DatabaseResult<InsertionResult>;

    async fn update_list(&self, id: &ListId, update: &ListUpdate) -> DatabaseResult<UpdateEffect>;

    /// Returns `false` if there was no list with `id`.
    async fn delete_list(&self, id: &ListId) -> DatabaseResult<bool>;
}

pub struct Database<T> {
    pool: PgPool,
    _phantom: PhantomData<T>,
}

impl<T> Database<T> {
    pub async fn new(addr: &str) -> DatabaseResult<Self> {
        trace!("connecting to database at '{}'", addr);
        let timer = time::Instant::now();
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(addr)
            .await?;
        trace!(
            "successfully connected to database at '{}' in {:?}",
            addr,
            timer.elapsed()
        );
        Ok(Self {
            pool,
            _phantom: PhantomData,
        })
    }

    /// A database handle for another table, sharing this handle's connection pool.
    pub fn share<U>(&self) -> Database<U> {
        Database {
            pool: self.pool.clone(),
            _phantom: PhantomData,
        }
    }

    async fn get_connection(&self) -> DatabaseResult<PoolConnection<Postgres>> {
        Ok(self.pool.acquire().await?)
    }
}

#[derive(Debug)]
pub enum DatabaseError {
    SqlxError(sqlx::Error),
    UnexpectedRowCount(u64),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(sqlx_error: sqlx::Error) -> Self {
        DatabaseError::SqlxError(sqlx_error)
    }
}

impl Display for DatabaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            DatabaseError::SqlxError(e) => e.to_string(),
            DatabaseError::UnexpectedRowCount(rows) => {
                format!("statement affected an unexpected number of rows: {}", rows)
            }
        };

        write!(f, "{}", output)
    }
}

impl std::error::Error for DatabaseError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertionResult {
    Inserted,
    AlreadyExists,
}

impl InsertionResult {
    pub(crate) fn from_changed_rows(changed_rows: u64) -> DatabaseResult<Self> {
        match changed_rows {
            1 => Ok(Self::Inserted),
            0 => Ok(Self::AlreadyExists),
            _ => {
                error!("insertion resulted in {} changed rows", changed_rows);
                Err(DatabaseError::UnexpectedRowCount(changed_rows))
            }
        }
    }
}
