//! Coupons Repository

use arbor::coupons::{Coupon, CouponCode};
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::platform::{PlatformClient, PlatformError};

use super::records::CouponRecord;

/// Read and bookkeeping access to the platform's coupons table.
#[automock]
#[async_trait]
pub trait CouponsRepository: Send + Sync {
    /// Find the active coupon with the given canonical code.
    ///
    /// `None` means no such code exists — distinct from a coupon that is
    /// found but fails an eligibility check.
    async fn find_active(&self, code: &CouponCode) -> Result<Option<Coupon>, PlatformError>;

    /// Re-read a coupon by id, regardless of its active flag.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Coupon>, PlatformError>;

    /// Conditionally increment `used_count` from an observed value.
    ///
    /// The update only matches the row still holding the observed count, so
    /// a `false` return means the counter moved since it was read; the
    /// caller re-reads and decides whether to retry.
    async fn increment_usage(
        &self,
        id: Uuid,
        observed_used_count: u32,
    ) -> Result<bool, PlatformError>;
}

/// Platform-backed coupons repository.
#[derive(Debug, Clone)]
pub struct RestCouponsRepository {
    platform: PlatformClient,
}

impl RestCouponsRepository {
    /// Create a repository over the given platform client.
    #[must_use]
    pub fn new(platform: PlatformClient) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl CouponsRepository for RestCouponsRepository {
    async fn find_active(&self, code: &CouponCode) -> Result<Option<Coupon>, PlatformError> {
        let rows: Vec<CouponRecord> = self
            .platform
            .select(
                "coupons",
                &[
                    ("code", format!("eq.{code}")),
                    ("is_active", "eq.true".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        Ok(rows.into_iter().next().map(CouponRecord::into_coupon))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Coupon>, PlatformError> {
        let rows: Vec<CouponRecord> = self
            .platform
            .select(
                "coupons",
                &[("id", format!("eq.{id}")), ("limit", "1".to_string())],
            )
            .await?;

        Ok(rows.into_iter().next().map(CouponRecord::into_coupon))
    }

    async fn increment_usage(
        &self,
        id: Uuid,
        observed_used_count: u32,
    ) -> Result<bool, PlatformError> {
        let updated: Vec<CouponRecord> = self
            .platform
            .update(
                "coupons",
                &[
                    ("id", format!("eq.{id}")),
                    ("used_count", format!("eq.{observed_used_count}")),
                ],
                &serde_json::json!({ "used_count": observed_used_count + 1 }),
            )
            .await?;

        Ok(!updated.is_empty())
    }
}
