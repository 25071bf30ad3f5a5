//! PostgreSQL-backed `LedgerRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{LedgerRepository, LedgerRepositoryError};
use crate::domain::{Direction, LedgerEntry, UserId};

use super::diesel_error_mapping::{diesel_error, pool_error};
use super::models::{LedgerEntryRow, NewLedgerEntryRow};
use super::pool::{DbPool, PoolError};
use super::schema::ledger_entries;

/// Diesel-backed implementation of the `LedgerRepository` port.
///
/// Only appends and reads. Grant-linked `OUT` entries are written and
/// deleted by the grant repository inside its transition transaction.
#[derive(Clone)]
pub struct DieselLedgerRepository {
    pool: DbPool,
}

impl DieselLedgerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> LedgerRepositoryError {
    pool_error(error, LedgerRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> LedgerRepositoryError {
    diesel_error(
        error,
        LedgerRepositoryError::query,
        LedgerRepositoryError::connection,
    )
}

#[async_trait]
impl LedgerRepository for DieselLedgerRepository {
    async fn append(&self, entry: &LedgerEntry) -> Result<(), LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(ledger_entries::table)
            .values(NewLedgerEntryRow::from(entry))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        direction: Direction,
    ) -> Result<Vec<LedgerEntry>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<LedgerEntryRow> = ledger_entries::table
            .filter(ledger_entries::user_id.eq(user_id.as_uuid()))
            .filter(ledger_entries::direction.eq(direction.as_str()))
            .order(ledger_entries::created_at.asc())
            .select(LedgerEntryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(LedgerEntry::try_from)
            .collect::<Result<_, _>>()
            .map_err(|err| LedgerRepositoryError::query(err.to_string()))
    }
}
