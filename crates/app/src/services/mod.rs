mod blogs;
mod contributions;
mod gate;
mod pinned;
mod projects;
mod status;

use std::sync::Arc;

use upstream::{GithubClient, WakaTimeClient};

use crate::config::AppConfig;
use crate::error::Result;
use folio_db::Db;

pub use blogs::{BlogsService, CreateBlogRequest};
pub use contributions::ContributionsService;
pub use pinned::{CreatePinnedProjectRequest, PinnedProjectsService, UpdatePinnedProjectRequest};
pub use projects::ProjectsService;
pub use status::StatusCache;

type SharedConfig = Arc<AppConfig>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub status: Arc<StatusCache<WakaTimeClient>>,
    pub projects: Arc<ProjectsService>,
    pub contributions: Arc<ContributionsService>,
    pub blogs: BlogsService,
    pub pinned: PinnedProjectsService,
}

impl AppServices {
    pub fn new(config: &AppConfig) -> Self {
        let shared = Arc::new(config.clone());
        let wakatime = WakaTimeClient::new(
            config.wakatime.api_key.clone(),
            config.wakatime.base_url.clone(),
        );
        let github = GithubClient::new(
            config.github.username.clone(),
            config.github.token.clone(),
            config.github.base_url.clone(),
        );
        Self {
            status: Arc::new(StatusCache::new(
                wakatime,
                config.wakatime.cooldown_ms,
                config.wakatime.activity_window_seconds,
            )),
            projects: Arc::new(ProjectsService::new(github.clone())),
            contributions: Arc::new(ContributionsService::new(github)),
            blogs: BlogsService::new(shared.clone()),
            pinned: PinnedProjectsService::new(shared),
        }
    }
}

fn open_db(config: &SharedConfig) -> Result<Db> {
    Ok(Db::open(&config.db_path)?)
}
