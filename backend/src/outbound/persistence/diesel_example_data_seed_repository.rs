//! Writes a demo dataset in one PostgreSQL transaction.
//!
//! Order inside the transaction: seed run claim, users, grants, then every
//! ledger entry (donations plus the `OUT` entries of granted requests).

use async_trait::async_trait;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{
    ExampleDataSeedRepository, ExampleDataSeedRepositoryError, ExampleDataSeedRequest,
    SeedingResult,
};

use super::diesel_error_mapping::{diesel_error, pool_error};
use super::models::{NewExampleDataSeedRow, NewLedgerEntryRow, NewRequestGrantRow, NewUserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{example_data_seeds, ledger_entries, request_grants, users};

/// [`ExampleDataSeedRepository`] over the shared [`DbPool`].
#[derive(Clone)]
pub struct DieselExampleDataSeedRepository {
    pool: DbPool,
}

impl DieselExampleDataSeedRepository {
    /// Wrap a pool handle.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ExampleDataSeedRepositoryError {
    pool_error(error, ExampleDataSeedRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ExampleDataSeedRepositoryError {
    diesel_error(
        error,
        ExampleDataSeedRepositoryError::query,
        ExampleDataSeedRepositoryError::connection,
    )
}

fn count_column(len: usize, what: &str) -> Result<i32, ExampleDataSeedRepositoryError> {
    i32::try_from(len)
        .map_err(|_| ExampleDataSeedRepositoryError::query(format!("{what} count overflow")))
}

#[async_trait]
impl ExampleDataSeedRepository for DieselExampleDataSeedRepository {
    async fn seed_example_data(
        &self,
        request: ExampleDataSeedRequest,
    ) -> Result<SeedingResult, ExampleDataSeedRepositoryError> {
        let ExampleDataSeedRequest {
            seed_key,
            seed,
            users: seed_users,
            donations,
            grants,
        } = request;

        let run = NewExampleDataSeedRow {
            seed_key: seed_key.as_str(),
            seed,
            user_count: count_column(seed_users.len(), "user")?,
            donation_count: count_column(donations.len(), "donation")?,
            grant_count: count_column(grants.len(), "grant")?,
        };
        let user_rows: Vec<NewUserRow<'_>> = seed_users.iter().map(NewUserRow::from).collect();
        let grant_rows: Vec<NewRequestGrantRow<'_>> = grants
            .iter()
            .map(|seeded| NewRequestGrantRow::from(&seeded.grant))
            .collect();
        let ledger_rows: Vec<NewLedgerEntryRow<'_>> = donations
            .iter()
            .chain(grants.iter().filter_map(|seeded| seeded.entry.as_ref()))
            .map(NewLedgerEntryRow::from)
            .collect();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let recorded = diesel::insert_into(example_data_seeds::table)
                    .values(&run)
                    .on_conflict(example_data_seeds::seed_key)
                    .do_nothing()
                    .execute(conn)
                    .await?;
                if recorded == 0 {
                    return Ok(SeedingResult::AlreadySeeded);
                }

                if !user_rows.is_empty() {
                    diesel::insert_into(users::table)
                        .values(&user_rows)
                        .on_conflict_do_nothing()
                        .execute(conn)
                        .await?;
                }
                // The grant → ledger link is deferred, so grants may land
                // before the entries they reference.
                if !grant_rows.is_empty() {
                    diesel::insert_into(request_grants::table)
                        .values(&grant_rows)
                        .execute(conn)
                        .await?;
                }
                if !ledger_rows.is_empty() {
                    diesel::insert_into(ledger_entries::table)
                        .values(&ledger_rows)
                        .execute(conn)
                        .await?;
                }

                Ok(SeedingResult::Applied)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
