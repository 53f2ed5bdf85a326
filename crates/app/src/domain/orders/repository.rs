//! Orders Repository

use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::platform::{PlatformClient, PlatformError};

use super::records::{CreatedOrderRow, OrderItemRow, OrderRow};

/// Write access to the platform's orders tables.
#[automock]
#[async_trait]
pub trait OrdersRepository: Send + Sync {
    /// Insert the order row, returning the platform's row id.
    async fn create_order(&self, row: OrderRow) -> Result<Uuid, PlatformError>;

    /// Insert the order's line items in one batch.
    async fn create_order_items(&self, rows: Vec<OrderItemRow>) -> Result<(), PlatformError>;
}

/// Platform-backed orders repository.
#[derive(Debug, Clone)]
pub struct RestOrdersRepository {
    platform: PlatformClient,
}

impl RestOrdersRepository {
    /// Create a repository over the given platform client.
    #[must_use]
    pub fn new(platform: PlatformClient) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl OrdersRepository for RestOrdersRepository {
    async fn create_order(&self, row: OrderRow) -> Result<Uuid, PlatformError> {
        let created: Vec<CreatedOrderRow> = self.platform.insert("orders", &[row]).await?;

        created.first().map(|row| row.id).ok_or_else(|| {
            PlatformError::UnexpectedResponse(
                "orders insert returned no representation".to_string(),
            )
        })
    }

    async fn create_order_items(&self, rows: Vec<OrderItemRow>) -> Result<(), PlatformError> {
        let _created: Vec<serde_json::Value> = self.platform.insert("order_items", &rows).await?;

        Ok(())
    }
}
