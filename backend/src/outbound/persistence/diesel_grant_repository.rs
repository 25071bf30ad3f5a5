//! PostgreSQL-backed `GrantRepository` implementation using Diesel ORM.
//!
//! Transitions commit in a single transaction: the grant row is updated under
//! a revision check and the linked `OUT` ledger entry is inserted or deleted
//! alongside it. Either both writes land or neither does.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{GrantRepository, GrantRepositoryError};
use crate::domain::{LedgerEffect, RequestGrant, TransitionPlan};

use super::diesel_error_mapping::{diesel_error, pool_error, violates_unique};
use super::models::{
    GrantTransitionUpdate, NewLedgerEntryRow, NewRequestGrantRow, RequestGrantRow,
    revision_column,
};
use super::pool::{DbPool, PoolError};
use super::schema::{ledger_entries, request_grants};

const LEDGER_LINK_CONSTRAINT: &str = "ledger_entries_request_grant_id_key";

/// Diesel-backed implementation of the `GrantRepository` port.
#[derive(Clone)]
pub struct DieselGrantRepository {
    pool: DbPool,
}

impl DieselGrantRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> GrantRepositoryError {
    pool_error(error, GrantRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> GrantRepositoryError {
    diesel_error(
        error,
        GrantRepositoryError::query,
        GrantRepositoryError::connection,
    )
}

/// Failure inside the transition transaction.
#[derive(Debug)]
enum CommitFailure {
    /// The grant moved past the expected revision.
    Stale,
    Diesel(DieselError),
}

impl From<DieselError> for CommitFailure {
    fn from(error: DieselError) -> Self {
        Self::Diesel(error)
    }
}

impl CommitFailure {
    fn into_port_error(self, plan: &TransitionPlan) -> GrantRepositoryError {
        match self {
            Self::Stale => {
                GrantRepositoryError::revision_mismatch(plan.grant_id, plan.expected_revision)
            }
            Self::Diesel(error) => map_diesel_error(error),
        }
    }
}

/// A concurrent materialisation holds the unique grant link; treat the
/// collision as a lost race so the caller re-reads the grant.
fn map_materialize_error(error: DieselError) -> CommitFailure {
    if violates_unique(&error, LEDGER_LINK_CONSTRAINT) {
        CommitFailure::Stale
    } else {
        CommitFailure::Diesel(error)
    }
}

async fn apply_transition(
    conn: &mut AsyncPgConnection,
    plan: &TransitionPlan,
) -> Result<(), CommitFailure> {
    if let LedgerEffect::Materialize(entry) = &plan.effect {
        diesel::insert_into(ledger_entries::table)
            .values(NewLedgerEntryRow::from(entry))
            .execute(conn)
            .await
            .map_err(map_materialize_error)?;
    }

    let update = GrantTransitionUpdate {
        status: plan.to.as_str(),
        ledger_entry_id: plan.ledger_entry_id,
        revision: revision_column(plan.expected_revision.saturating_add(1)),
        updated_at: plan.updated_at,
    };
    let updated = diesel::update(
        request_grants::table
            .filter(request_grants::id.eq(plan.grant_id))
            .filter(request_grants::revision.eq(revision_column(plan.expected_revision))),
    )
    .set(&update)
    .execute(conn)
    .await?;
    if updated == 0 {
        return Err(CommitFailure::Stale);
    }

    if let LedgerEffect::Retract { entry_id } = &plan.effect {
        diesel::delete(
            ledger_entries::table
                .filter(ledger_entries::id.eq(entry_id))
                .filter(ledger_entries::request_grant_id.eq(plan.grant_id)),
        )
        .execute(conn)
        .await?;
    }

    Ok(())
}

#[async_trait]
impl GrantRepository for DieselGrantRepository {
    async fn create(&self, grant: &RequestGrant) -> Result<(), GrantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(request_grants::table)
            .values(NewRequestGrantRow::from(grant))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<RequestGrant>, GrantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<RequestGrantRow> = request_grants::table
            .filter(request_grants::id.eq(id))
            .select(RequestGrantRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(RequestGrant::try_from)
            .transpose()
            .map_err(|err| GrantRepositoryError::query(err.to_string()))
    }

    async fn list_all(&self) -> Result<Vec<RequestGrant>, GrantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<RequestGrantRow> = request_grants::table
            .order(request_grants::created_at.desc())
            .select(RequestGrantRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(RequestGrant::try_from)
            .collect::<Result<_, _>>()
            .map_err(|err| GrantRepositoryError::query(err.to_string()))
    }

    async fn commit_transition(&self, plan: &TransitionPlan) -> Result<(), GrantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result = conn
            .transaction::<_, CommitFailure, _>(|conn| {
                async move { apply_transition(conn, plan).await }.scope_boxed()
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(failure) => {
                debug!(
                    grant_id = %plan.grant_id,
                    expected_revision = plan.expected_revision,
                    ?failure,
                    "grant transition rolled back"
                );
                Err(failure.into_port_error(plan))
            }
        }
    }
}
