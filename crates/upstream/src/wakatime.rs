use serde::Deserialize;
use serde::de::DeserializeOwned;

use folio_core::{DailySummary, HeartbeatRecord, ProjectTime};

use crate::types::{Result, UpstreamError};

pub const WAKATIME_BASE_URL: &str = "https://wakatime.com/api/v1/users/current";

/// The two independent reads the status cache performs against the
/// time-tracking service. Implemented by [`WakaTimeClient`] and by test
/// fakes; either call yields `None` when the upstream has no data for today.
#[allow(async_fn_in_trait)]
pub trait ActivitySource {
    async fn latest_heartbeat(&self) -> Result<Option<HeartbeatRecord>>;
    async fn today_summary(&self) -> Result<Option<DailySummary>>;
}

#[derive(Clone)]
pub struct WakaTimeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WakaTimeClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }
}

impl ActivitySource for WakaTimeClient {
    async fn latest_heartbeat(&self) -> Result<Option<HeartbeatRecord>> {
        let url = format!(
            "{}/heartbeats?date=today&api_key={}",
            self.base_url, self.api_key
        );
        let envelope: HeartbeatsEnvelope = self.get_json(&url).await?;
        Ok(envelope.data.into_iter().next().map(HeartbeatRecord::from))
    }

    async fn today_summary(&self) -> Result<Option<DailySummary>> {
        let url = format!(
            "{}/summaries?start=today&end=today&api_key={}",
            self.base_url, self.api_key
        );
        let envelope: SummariesEnvelope = self.get_json(&url).await?;
        Ok(envelope.data.into_iter().next().map(DailySummary::from))
    }
}

// Wire envelopes. Every field defaults so payloads with dropped fields parse
// as absence instead of failing the whole call.

#[derive(Debug, Default, Deserialize)]
struct HeartbeatsEnvelope {
    #[serde(default)]
    data: Vec<HeartbeatEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct HeartbeatEntry {
    #[serde(default)]
    project: Option<String>,
    #[serde(default)]
    branch: Option<String>,
    #[serde(default)]
    editor: Option<String>,
    #[serde(default)]
    entity: Option<String>,
    #[serde(default)]
    time: f64,
}

impl From<HeartbeatEntry> for HeartbeatRecord {
    fn from(entry: HeartbeatEntry) -> Self {
        Self {
            project: entry.project,
            branch: entry.branch,
            editor: entry.editor,
            entity: entry.entity,
            time: entry.time,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SummariesEnvelope {
    #[serde(default)]
    data: Vec<SummaryEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryEntry {
    #[serde(default)]
    grand_total: Option<GrandTotal>,
    #[serde(default)]
    projects: Vec<ProjectEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct GrandTotal {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProjectEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl From<SummaryEntry> for DailySummary {
    fn from(entry: SummaryEntry) -> Self {
        Self {
            total_text: entry.grand_total.and_then(|total| total.text),
            projects: entry
                .projects
                .into_iter()
                .filter_map(|project| {
                    Some(ProjectTime {
                        name: project.name?,
                        text: project.text?,
                    })
                })
                .collect(),
        }
    }
}
