//! Grouped ledger and grant reads backing inventory statistics.
//!
//! Both reads run in one read-only `REPEATABLE READ` transaction, so a grant
//! committed while the report is being built appears in both halves or in
//! neither.

use async_trait::async_trait;
use diesel::dsl::{count, sum};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{InventoryRepository, InventoryRepositoryError};
use crate::domain::{
    BloodGroup, Direction, GrantStatus, InventoryTallies, LedgerTally, RequestTally, UserId,
};

use super::diesel_error_mapping::{diesel_error, pool_error};
use super::pool::{DbPool, PoolError};
use super::schema::{ledger_entries, request_grants};

/// Diesel-backed implementation of the `InventoryRepository` port.
///
/// Aggregation happens in PostgreSQL; only one row per group crosses the
/// wire.
#[derive(Clone)]
pub struct DieselInventoryRepository {
    pool: DbPool,
}

impl DieselInventoryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> InventoryRepositoryError {
    pool_error(error, InventoryRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> InventoryRepositoryError {
    diesel_error(
        error,
        InventoryRepositoryError::query,
        InventoryRepositoryError::connection,
    )
}

fn parse_label<T: std::str::FromStr>(
    column: &str,
    raw: &str,
) -> Result<T, InventoryRepositoryError> {
    raw.parse()
        .map_err(|_| InventoryRepositoryError::query(format!("corrupt {column}: {raw:?}")))
}

type LedgerGroupRow = (String, String, Uuid, Option<i64>, i64);
type RequestGroupRow = (String, String, i64, Option<i64>);

fn ledger_tally(row: LedgerGroupRow) -> Result<LedgerTally, InventoryRepositoryError> {
    let (blood_group, direction, user_id, quantity, transactions) = row;
    Ok(LedgerTally {
        blood_group: parse_label::<BloodGroup>("blood_group", &blood_group)?,
        direction: parse_label::<Direction>("direction", &direction)?,
        user_id: UserId::from_uuid(user_id),
        quantity: quantity.unwrap_or_default(),
        transactions,
    })
}

fn request_tally(row: RequestGroupRow) -> Result<RequestTally, InventoryRepositoryError> {
    let (blood_group, status, requests, quantity) = row;
    Ok(RequestTally {
        blood_group: parse_label::<BloodGroup>("blood_group", &blood_group)?,
        status: parse_label::<GrantStatus>("status", &status)?,
        requests,
        quantity: quantity.unwrap_or_default(),
    })
}

async fn ledger_groups(conn: &mut AsyncPgConnection) -> Result<Vec<LedgerGroupRow>, DieselError> {
    ledger_entries::table
        .group_by((
            ledger_entries::blood_group,
            ledger_entries::direction,
            ledger_entries::user_id,
        ))
        .select((
            ledger_entries::blood_group,
            ledger_entries::direction,
            ledger_entries::user_id,
            sum(ledger_entries::quantity),
            count(ledger_entries::id),
        ))
        .load(conn)
        .await
}

async fn request_groups(
    conn: &mut AsyncPgConnection,
) -> Result<Vec<RequestGroupRow>, DieselError> {
    request_grants::table
        .group_by((request_grants::blood_group, request_grants::status))
        .select((
            request_grants::blood_group,
            request_grants::status,
            count(request_grants::id),
            sum(request_grants::quantity),
        ))
        .load(conn)
        .await
}

#[async_trait]
impl InventoryRepository for DieselInventoryRepository {
    async fn tallies(&self) -> Result<InventoryTallies, InventoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (ledger_rows, request_rows) = conn
            .build_transaction()
            .read_only()
            .repeatable_read()
            .run::<_, DieselError, _>(|conn| {
                async move {
                    let ledger = ledger_groups(conn).await?;
                    let requests = request_groups(conn).await?;
                    Ok((ledger, requests))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(InventoryTallies {
            ledger: ledger_rows
                .into_iter()
                .map(ledger_tally)
                .collect::<Result<_, _>>()?,
            requests: request_rows
                .into_iter()
                .map(request_tally)
                .collect::<Result<_, _>>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn ledger_groups_convert_into_tallies() {
        let tally = ledger_tally(("A-".to_owned(), "OUT".to_owned(), Uuid::nil(), Some(20), 1))
            .expect("valid group");

        assert_eq!(tally.blood_group, BloodGroup::ANegative);
        assert_eq!(tally.direction, Direction::Out);
        assert_eq!(tally.quantity, 20);
    }

    #[rstest]
    fn corrupt_status_labels_are_query_errors() {
        let err = request_tally(("O+".to_owned(), "approved".to_owned(), 2, Some(10)))
            .expect_err("corrupt status");

        assert!(matches!(err, InventoryRepositoryError::Query { .. }));
        assert!(err.to_string().contains("approved"));
    }
}
