//! Inventory statistics service.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{InventoryRepository, InventoryRepositoryError, InventoryStatsQuery};
use crate::domain::{Error, InventoryStats, Principal};

fn map_repository_error(error: InventoryRepositoryError) -> Error {
    match error {
        InventoryRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("inventory repository unavailable: {message}"))
        }
        InventoryRepositoryError::Query { message } => {
            Error::internal(format!("inventory repository error: {message}"))
        }
    }
}

/// Inventory service implementing [`InventoryStatsQuery`].
#[derive(Clone)]
pub struct InventoryService<R> {
    inventory: Arc<R>,
}

impl<R> InventoryService<R> {
    /// Create the service over an inventory repository.
    pub fn new(inventory: Arc<R>) -> Self {
        Self { inventory }
    }
}

#[async_trait]
impl<R> InventoryStatsQuery for InventoryService<R>
where
    R: InventoryRepository,
{
    async fn inventory_stats(&self, principal: &Principal) -> Result<InventoryStats, Error> {
        principal.require_admin()?;
        let tallies = self
            .inventory
            .tallies()
            .await
            .map_err(map_repository_error)?;
        Ok(InventoryStats::from_tallies(
            &tallies.ledger,
            &tallies.requests,
        ))
    }
}
