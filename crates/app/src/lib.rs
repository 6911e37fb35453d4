pub mod app;
pub mod config;
pub mod error;
pub mod services;

pub use app::{AppState, setup_db};
pub use config::{AppConfig, DEFAULT_STATUS_COOLDOWN_MS, GithubConfig, WakaTimeConfig};
pub use error::{ApiError, AppError, Result};
pub use services::{
    AppServices, BlogsService, ContributionsService, CreateBlogRequest,
    CreatePinnedProjectRequest, PinnedProjectsService, ProjectsService, StatusCache,
    UpdatePinnedProjectRequest,
};
