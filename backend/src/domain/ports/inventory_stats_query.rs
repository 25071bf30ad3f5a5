//! Driving port for inventory analytics.

use async_trait::async_trait;

use crate::domain::{Error, InventoryStats, Principal};

/// Domain use-case port for inventory statistics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryStatsQuery: Send + Sync {
    /// Compute inventory statistics. Admin only.
    async fn inventory_stats(&self, principal: &Principal) -> Result<InventoryStats, Error>;
}
