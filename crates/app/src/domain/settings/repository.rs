//! Settings Repository

use arbor::membership::DiscountSettings;
use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;

use crate::platform::{PlatformClient, PlatformError};

use super::records::SettingRecord;

/// Key of the VIP discount setting.
const VIP_KEY: &str = "vip_discount_percentage";

/// Key of the VVIP discount setting.
const VVIP_KEY: &str = "vvip_discount_percentage";

/// Read access to admin-configured settings.
#[automock]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Fetch the member discount rates.
    ///
    /// Missing rows degrade to per-field defaults inside
    /// [`DiscountSettings::from_raw`]; callers additionally fall back to
    /// full defaults on transport errors, so checkout never blocks on this
    /// read.
    async fn fetch_discount_settings(&self) -> Result<DiscountSettings, PlatformError>;
}

/// Platform-backed settings repository.
#[derive(Debug, Clone)]
pub struct RestSettingsRepository {
    platform: PlatformClient,
}

impl RestSettingsRepository {
    /// Create a repository over the given platform client.
    #[must_use]
    pub fn new(platform: PlatformClient) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl SettingsRepository for RestSettingsRepository {
    async fn fetch_discount_settings(&self) -> Result<DiscountSettings, PlatformError> {
        let rows: Vec<SettingRecord> = self
            .platform
            .select(
                "system_settings",
                &[
                    ("select", "setting_key,setting_value".to_string()),
                    ("setting_key", format!("in.({VIP_KEY},{VVIP_KEY})")),
                ],
            )
            .await?;

        let mut values: FxHashMap<String, String> = FxHashMap::default();

        for row in rows {
            if let Some(value) = row.setting_value {
                values.insert(row.setting_key, value);
            }
        }

        Ok(DiscountSettings::from_raw(
            values.get(VIP_KEY).map(String::as_str),
            values.get(VVIP_KEY).map(String::as_str),
        ))
    }
}
