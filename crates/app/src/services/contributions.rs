use tokio::sync::RwLock;

use folio_core::ContributionCalendar;
use upstream::GithubClient;

use crate::error::Result;

/// Fetch-once cache for the contribution calendar. The calendar only moves
/// once a day; the cache holds until explicitly cleared.
pub struct ContributionsService {
    client: GithubClient,
    cached: RwLock<Option<ContributionCalendar>>,
}

impl ContributionsService {
    pub(super) fn new(client: GithubClient) -> Self {
        Self {
            client,
            cached: RwLock::new(None),
        }
    }

    pub async fn get(&self) -> Result<ContributionCalendar> {
        if let Some(calendar) = self.cached.read().await.clone() {
            return Ok(calendar);
        }
        let calendar = self.client.contributions().await?;
        *self.cached.write().await = Some(calendar.clone());
        Ok(calendar)
    }

    pub async fn clear(&self) {
        *self.cached.write().await = None;
    }
}
