use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Maximum age of a heartbeat, in seconds, for the subject to count as
/// actively coding.
pub const DEFAULT_ACTIVITY_WINDOW_SECS: f64 = 600.0;

/// Most recent coding-activity ping reported by the editor plugin.
///
/// Field names follow the upstream wire names; every string field may be
/// missing upstream, which is treated as absence rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatRecord {
    pub project: Option<String>,
    pub branch: Option<String>,
    pub editor: Option<String>,
    pub entity: Option<String>,
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTime {
    pub name: String,
    pub text: String,
}

/// Aggregated time spent today, with per-project rollups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub total_text: Option<String>,
    pub projects: Vec<ProjectTime>,
}

impl DailySummary {
    /// Case-insensitive per-project lookup; upstream project names do not
    /// reliably match the heartbeat casing.
    pub fn time_for_project(&self, name: &str) -> Option<&str> {
        self.projects
            .iter()
            .find(|project| project.name.eq_ignore_ascii_case(name))
            .map(|project| project.text.as_str())
    }
}

/// The normalized activity record currently being served to readers.
///
/// The default instance (process start, nothing observed yet) has
/// `is_active = false` and every optional field unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySnapshot {
    pub is_active: bool,
    pub editor_name: Option<String>,
    pub project_name: Option<String>,
    pub current_file: Option<String>,
    pub last_active_time_text: Option<String>,
    pub total_time_all_projects_text: Option<String>,
    pub total_time_current_project_text: Option<String>,
}

/// Merge a heartbeat and a daily summary into one snapshot.
///
/// Either input may be absent; the builder fills what it can and leaves the
/// rest unset. A heartbeat aged `activity_window_seconds` or more renders the
/// subject inactive.
pub fn build_snapshot(
    heartbeat: Option<&HeartbeatRecord>,
    summary: Option<&DailySummary>,
    now_seconds: f64,
    activity_window_seconds: f64,
) -> ActivitySnapshot {
    let mut snapshot = ActivitySnapshot::default();

    if let Some(heartbeat) = heartbeat {
        snapshot.is_active = now_seconds - heartbeat.time < activity_window_seconds;
        snapshot.editor_name = heartbeat.editor.clone();
        snapshot.project_name = heartbeat.project.clone();
        snapshot.current_file = Some(file_name_from_path(heartbeat.entity.as_deref()));
        snapshot.last_active_time_text = Some(clock_time_utc(heartbeat.time));
    }

    snapshot.total_time_all_projects_text = Some(
        summary
            .and_then(|summary| summary.total_text.clone())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| "0 mins".to_string()),
    );

    if let (Some(heartbeat), Some(summary)) = (heartbeat, summary) {
        if let Some(project) = heartbeat.project.as_deref() {
            snapshot.total_time_current_project_text = Some(
                summary
                    .time_for_project(project)
                    .unwrap_or("Just started")
                    .to_string(),
            );
        }
    }

    snapshot
}

/// Last path segment of an editor entity, splitting on both `/` and `\`.
pub fn file_name_from_path(path: Option<&str>) -> String {
    let Some(path) = path else {
        return "Unknown".to_string();
    };
    match path.rfind(['/', '\\']) {
        Some(index) => path[index + 1..].to_string(),
        None => path.to_string(),
    }
}

/// Wall-clock `HH:MM:SS` rendering of a unix timestamp, 24-hour, UTC.
pub fn clock_time_utc(unix_seconds: f64) -> String {
    DateTime::from_timestamp(unix_seconds as i64, 0)
        .map(|moment| moment.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "00:00:00".to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedProject {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub github_url: Option<String>,
}

/// Repository metadata passed through from the code-hosting API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubRepo {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "html_url")]
    pub url: String,
    #[serde(rename = "stargazers_count", default)]
    pub stars: u64,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionDay {
    pub date: String,
    pub count: u32,
    pub level: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionCalendar {
    pub total_contributions: u32,
    pub days: Vec<ContributionDay>,
}

/// Pagination envelope matching the shape the front end consumes.
/// `number` is the zero-based page index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_pages: u64,
    pub total_elements: u64,
    pub size: u64,
    pub number: u64,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, page_no: u64, page_size: u64, total_elements: u64) -> Self {
        let number = page_no.saturating_sub(1);
        let total_pages = if page_size == 0 {
            0
        } else {
            total_elements.div_ceil(page_size)
        };
        let empty = content.is_empty();
        Self {
            content,
            total_pages,
            total_elements,
            size: page_size,
            number,
            first: number == 0,
            last: number + 1 >= total_pages,
            empty,
        }
    }
}
