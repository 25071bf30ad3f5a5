//! Port for the grouped reads behind inventory statistics.

use async_trait::async_trait;

use crate::domain::InventoryTallies;

use super::define_port_error;

define_port_error! {
    /// Errors raised by inventory repository adapters.
    pub enum InventoryRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "inventory repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "inventory repository query failed: {message}",
    }
}

/// Port for aggregate reads over the ledger and grants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Ledger grouped by blood group, direction and user, and grants grouped
    /// by blood group and status, both read from the same snapshot so a
    /// committed grant shows up in both or neither.
    async fn tallies(&self) -> Result<InventoryTallies, InventoryRepositoryError>;
}
