use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

use folio_core::GithubRepo;
use upstream::GithubClient;

use crate::error::Result;
use crate::services::gate::RefreshGate;

/// Minimum interval between repo-list refreshes.
const REPO_COOLDOWN_MS: i64 = 600_000;

/// Cached repository listing with 1-based pagination.
///
/// Same stale-while-refresh discipline as the status cache; an upstream
/// failure serves the cached list and only surfaces when nothing has been
/// fetched yet.
pub struct ProjectsService {
    client: GithubClient,
    gate: RefreshGate,
    refresh_lock: Mutex<()>,
    repos: RwLock<Vec<GithubRepo>>,
}

impl ProjectsService {
    pub(super) fn new(client: GithubClient) -> Self {
        Self {
            client,
            gate: RefreshGate::new(REPO_COOLDOWN_MS),
            refresh_lock: Mutex::new(()),
            repos: RwLock::new(Vec::new()),
        }
    }

    pub async fn page(&self, page_no: usize, page_size: usize) -> Result<Vec<GithubRepo>> {
        self.refresh_if_due().await?;
        let repos = self.repos.read().await;
        Ok(page_slice(&repos, page_no, page_size))
    }

    async fn refresh_if_due(&self) -> Result<()> {
        let now_ms = Utc::now().timestamp_millis();
        if !self.gate.is_due(now_ms) {
            return Ok(());
        }
        let Ok(_guard) = self.refresh_lock.try_lock() else {
            return Ok(());
        };
        if !self.gate.is_due(now_ms) {
            return Ok(());
        }
        self.gate.stamp(now_ms);
        match self.client.list_repos().await {
            Ok(repos) => {
                *self.repos.write().await = repos;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "repo list refresh failed");
                if self.repos.read().await.is_empty() {
                    Err(err.into())
                } else {
                    Ok(())
                }
            }
        }
    }
}

fn page_slice(repos: &[GithubRepo], page_no: usize, page_size: usize) -> Vec<GithubRepo> {
    let start = page_no.saturating_sub(1).saturating_mul(page_size);
    if start >= repos.len() {
        return Vec::new();
    }
    let end = (start + page_size).min(repos.len());
    repos[start..end].to_vec()
}
