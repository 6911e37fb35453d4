mod github;
mod types;
mod wakatime;

pub use github::{GITHUB_API_BASE_URL, GithubClient};
pub use types::{Result, UpstreamError};
pub use wakatime::{ActivitySource, WAKATIME_BASE_URL, WakaTimeClient};
