use reqwest::header;
use serde_json::{Value, json};

use folio_core::{ContributionCalendar, ContributionDay, GithubRepo};

use crate::types::{Result, UpstreamError};

pub const GITHUB_API_BASE_URL: &str = "https://api.github.com";

// GitHub rejects requests without a User-Agent.
const APP_USER_AGENT: &str = "folio-server";

#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(
        username: impl Into<String>,
        token: Option<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            username: username.into(),
            token,
        }
    }

    pub async fn list_repos(&self) -> Result<Vec<GithubRepo>> {
        let url = format!(
            "{}/users/{}/repos?sort=updated&direction=desc",
            self.base_url, self.username
        );
        let mut request = self.http.get(&url).header(header::USER_AGENT, APP_USER_AGENT);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }

    pub async fn contributions(&self) -> Result<ContributionCalendar> {
        let query = format!(
            "{{ user(login: \"{}\") {{ contributionsCollection {{ contributionCalendar \
             {{ totalContributions weeks {{ contributionDays \
             {{ contributionCount date contributionLevel }} }} }} }} }} }}",
            self.username
        );
        let url = format!("{}/graphql", self.base_url);
        let mut request = self
            .http
            .post(&url)
            .header(header::USER_AGENT, APP_USER_AGENT)
            .json(&json!({ "query": query }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }
        let body: Value = response.json().await?;
        Ok(flatten_contributions(&body))
    }
}

/// Flatten the GraphQL calendar (weeks of days) into one chronological day
/// list. A response without the calendar node yields an empty calendar.
fn flatten_contributions(body: &Value) -> ContributionCalendar {
    let Some(calendar) = body.pointer("/data/user/contributionsCollection/contributionCalendar")
    else {
        return ContributionCalendar::default();
    };
    let total = calendar["totalContributions"].as_u64().unwrap_or(0) as u32;
    let mut days = Vec::new();
    if let Some(weeks) = calendar["weeks"].as_array() {
        for week in weeks {
            if let Some(entries) = week["contributionDays"].as_array() {
                for day in entries {
                    days.push(ContributionDay {
                        date: day["date"].as_str().unwrap_or_default().to_string(),
                        count: day["contributionCount"].as_u64().unwrap_or(0) as u32,
                        level: contribution_level(day["contributionLevel"].as_str().unwrap_or("")),
                    });
                }
            }
        }
    }
    ContributionCalendar {
        total_contributions: total,
        days,
    }
}

fn contribution_level(level: &str) -> u8 {
    match level {
        "FIRST_QUARTILE" => 1,
        "SECOND_QUARTILE" => 2,
        "THIRD_QUARTILE" => 3,
        "FOURTH_QUARTILE" => 4,
        _ => 0,
    }
}
