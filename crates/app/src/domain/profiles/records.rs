//! Profile Records

use arbor::membership::{MemberProfile, MembershipTier};
use serde::Deserialize;
use uuid::Uuid;

/// Wire row of the platform's `profiles` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRecord {
    pub id: Uuid,
    #[serde(default)]
    pub membership_level: Option<String>,
    /// Legacy column kept for rows written before the rename.
    #[serde(default)]
    pub member_level: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl ProfileRecord {
    /// Maps the wire row into the domain profile.
    ///
    /// `membership_level` wins when it holds a value; empty strings fall
    /// through to the legacy column.
    #[must_use]
    pub fn into_profile(self) -> MemberProfile {
        let level = self
            .membership_level
            .as_deref()
            .filter(|level| !level.is_empty())
            .or(self.member_level.as_deref());

        let tier = MembershipTier::from_level(level);

        MemberProfile {
            user_id: self.id,
            tier,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
        }
    }
}
