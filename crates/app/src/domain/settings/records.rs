//! Settings Records

use serde::Deserialize;

/// Wire row of the platform's key-value `system_settings` table.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingRecord {
    pub setting_key: String,
    #[serde(default)]
    pub setting_value: Option<String>,
}
