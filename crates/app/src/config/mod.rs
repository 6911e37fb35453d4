use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use folio_core::DEFAULT_ACTIVITY_WINDOW_SECS;
use upstream::{GITHUB_API_BASE_URL, WAKATIME_BASE_URL};

use crate::error::{AppError, Result};

/// Minimum interval between status refresh attempts.
pub const DEFAULT_STATUS_COOLDOWN_MS: i64 = 60_000;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Clone, Debug)]
pub struct WakaTimeConfig {
    pub api_key: String,
    pub base_url: String,
    pub cooldown_ms: i64,
    pub activity_window_seconds: f64,
}

#[derive(Clone, Debug)]
pub struct GithubConfig {
    pub username: String,
    pub token: Option<String>,
    pub profile_url: String,
    pub base_url: String,
}

/// Everything the server needs to run, loaded once from the environment.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub port: u16,
    pub wakatime: WakaTimeConfig,
    pub github: GithubConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = require_var("WAKA_KEY", env::var("WAKA_KEY").ok())?;
        let username = require_var("GITHUB_NICKNAME", env::var("GITHUB_NICKNAME").ok())?;
        let token = non_empty_var("GITHUB_TOKEN");
        let profile_url = non_empty_var("GITHUB_ADDRESS")
            .unwrap_or_else(|| format!("https://github.com/{username}"));
        let cooldown_ms = parse_var(
            "STATUS_COOLDOWN_MS",
            env::var("STATUS_COOLDOWN_MS").ok(),
            DEFAULT_STATUS_COOLDOWN_MS,
        )?;
        let activity_window_seconds = parse_var(
            "ACTIVITY_WINDOW_SECS",
            env::var("ACTIVITY_WINDOW_SECS").ok(),
            DEFAULT_ACTIVITY_WINDOW_SECS,
        )?;
        let port = parse_var("FOLIO_PORT", env::var("FOLIO_PORT").ok(), DEFAULT_PORT)?;
        let db_path = resolve_db_path_with(env::var_os("FOLIO_DB").map(PathBuf::from), exe_dir());
        let wakatime_base =
            non_empty_var("WAKATIME_BASE_URL").unwrap_or_else(|| WAKATIME_BASE_URL.to_string());
        let github_base =
            non_empty_var("GITHUB_BASE_URL").unwrap_or_else(|| GITHUB_API_BASE_URL.to_string());
        Ok(Self {
            db_path,
            port,
            wakatime: WakaTimeConfig {
                api_key,
                base_url: wakatime_base,
                cooldown_ms,
                activity_window_seconds,
            },
            github: GithubConfig {
                username,
                token,
                profile_url,
                base_url: github_base,
            },
        })
    }
}

fn exe_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(PathBuf::from))
}

fn resolve_db_path_with(env_override: Option<PathBuf>, exe_dir: Option<PathBuf>) -> PathBuf {
    if let Some(path) = env_override {
        return path;
    }
    let base = exe_dir.unwrap_or_else(|| PathBuf::from("."));
    base.join("folio.sqlite")
}

fn require_var(name: &str, value: Option<String>) -> Result<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Message(format!("{name} is not set")))
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: FromStr>(name: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Message(format!("invalid {name}: {raw}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_path_prefers_env_override() {
        let resolved = resolve_db_path_with(Some(PathBuf::from("/data/folio.sqlite")), None);
        assert_eq!(resolved, PathBuf::from("/data/folio.sqlite"));
    }

    #[test]
    fn db_path_falls_back_to_exe_dir() {
        let resolved = resolve_db_path_with(None, Some(PathBuf::from("/opt/folio")));
        assert_eq!(resolved, PathBuf::from("/opt/folio/folio.sqlite"));
    }

    #[test]
    fn require_var_rejects_blank_values() {
        assert!(require_var("WAKA_KEY", Some("  ".to_string())).is_err());
        assert!(require_var("WAKA_KEY", None).is_err());
        let value = require_var("WAKA_KEY", Some(" secret ".to_string())).expect("value");
        assert_eq!(value, "secret");
    }

    #[test]
    fn parse_var_uses_default_when_unset() {
        let value = parse_var("STATUS_COOLDOWN_MS", None, DEFAULT_STATUS_COOLDOWN_MS)
            .expect("default cooldown");
        assert_eq!(value, DEFAULT_STATUS_COOLDOWN_MS);
    }

    #[test]
    fn parse_var_parses_and_rejects() {
        let value = parse_var("STATUS_COOLDOWN_MS", Some("30000".to_string()), 0i64)
            .expect("parsed cooldown");
        assert_eq!(value, 30_000);
        assert!(parse_var("STATUS_COOLDOWN_MS", Some("soon".to_string()), 0i64).is_err());
    }
}
