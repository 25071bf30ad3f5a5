//! Port for appending to and reading the blood ledger.

use async_trait::async_trait;

use crate::domain::{Direction, LedgerEntry, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ledger repository adapters.
    pub enum LedgerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "ledger repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "ledger repository query failed: {message}",
    }
}

/// Port for the append-only ledger.
///
/// Grant-driven `OUT` entries are written through
/// [`GrantRepository::commit_transition`](super::GrantRepository::commit_transition)
/// instead, so they stay atomic with the grant status.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Append one entry.
    async fn append(&self, entry: &LedgerEntry) -> Result<(), LedgerRepositoryError>;

    /// A user's entries in one direction, in any order.
    async fn list_for_user(
        &self,
        user_id: &UserId,
        direction: Direction,
    ) -> Result<Vec<LedgerEntry>, LedgerRepositoryError>;
}
