//! Profiles Repository

use arbor::membership::MemberProfile;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::platform::{PlatformClient, PlatformError};

use super::records::ProfileRecord;

/// Read access to member profiles.
#[automock]
#[async_trait]
pub trait ProfilesRepository: Send + Sync {
    /// Fetch the profile for a user; `None` for unknown users.
    async fn fetch(&self, user_id: Uuid) -> Result<Option<MemberProfile>, PlatformError>;
}

/// Platform-backed profiles repository.
#[derive(Debug, Clone)]
pub struct RestProfilesRepository {
    platform: PlatformClient,
}

impl RestProfilesRepository {
    /// Create a repository over the given platform client.
    #[must_use]
    pub fn new(platform: PlatformClient) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl ProfilesRepository for RestProfilesRepository {
    async fn fetch(&self, user_id: Uuid) -> Result<Option<MemberProfile>, PlatformError> {
        let rows: Vec<ProfileRecord> = self
            .platform
            .select(
                "profiles",
                &[("id", format!("eq.{user_id}")), ("limit", "1".to_string())],
            )
            .await?;

        Ok(rows.into_iter().next().map(ProfileRecord::into_profile))
    }
}
