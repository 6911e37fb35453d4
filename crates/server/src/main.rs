use std::path::PathBuf;

use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use folio_app::{
    ApiError, AppConfig, AppError, AppState, CreateBlogRequest, CreatePinnedProjectRequest,
    UpdatePinnedProjectRequest,
};
use folio_core::{ActivitySnapshot, BlogPost, ContributionCalendar, GithubRepo, Page, PinnedProject};

type HandlerError = (StatusCode, Json<ApiError>);

#[derive(Deserialize)]
struct PageQuery {
    #[serde(rename = "pageNo")]
    page_no: Option<u64>,
    #[serde(rename = "pageSize")]
    page_size: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigResponse {
    github_profile_url: String,
    github_username: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            std::process::exit(1);
        }
    };
    let state = AppState::new(config);
    if let Err(err) = state.initialize() {
        error!(error = %err, "failed to initialize database");
        std::process::exit(1);
    }

    let addr = format!("0.0.0.0:{}", state.config.port);
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("bind server");
    info!(%addr, "listening");
    axum::serve(listener, app).await.expect("serve");
}

fn build_app(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/health", get(health))
        .route("/api/status/current", get(status_current))
        .route("/api/projects", get(projects))
        .route("/api/github/contributions", get(contributions))
        .route(
            "/api/github/contributions/clear-cache",
            post(clear_contributions_cache),
        )
        .route("/api/blogs", get(blogs_list).post(blogs_add))
        .route("/api/blogs/:id", put(blogs_update).delete(blogs_delete))
        .route("/api/pinned-projects", get(pinned_list))
        .route("/api/pinned-projects/admin/add", post(pinned_add))
        .route("/api/pinned-projects/admin/update/:id", put(pinned_update))
        .route("/api/pinned-projects/admin/delete/:id", delete(pinned_delete))
        .route("/api/config", get(config_info))
        .with_state(state);

    let dist_dir = resolve_dist_dir();
    let static_service =
        ServeDir::new(&dist_dir).fallback(ServeFile::new(dist_dir.join("index.html")));

    api.fallback_service(static_service)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Never fails: the cache answers with the best snapshot it has, even when
/// both upstream calls are down.
async fn status_current(State(state): State<AppState>) -> Json<ActivitySnapshot> {
    Json(state.services.status.current().await)
}

async fn projects(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<GithubRepo>>, HandlerError> {
    let (page_no, page_size) = resolve_page(&query);
    let repos = state
        .services
        .projects
        .page(page_no as usize, page_size as usize)
        .await
        .map_err(to_api_error)?;
    Ok(Json(repos))
}

async fn contributions(
    State(state): State<AppState>,
) -> Result<Json<ContributionCalendar>, HandlerError> {
    state
        .services
        .contributions
        .get()
        .await
        .map(Json)
        .map_err(to_api_error)
}

async fn clear_contributions_cache(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.services.contributions.clear().await;
    Json(serde_json::json!({ "cleared": true }))
}

async fn blogs_list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<BlogPost>>, HandlerError> {
    let (page_no, page_size) = resolve_page(&query);
    state
        .services
        .blogs
        .page(page_no, page_size)
        .map(Json)
        .map_err(to_api_error)
}

async fn blogs_add(
    State(state): State<AppState>,
    Json(request): Json<CreateBlogRequest>,
) -> Result<Json<BlogPost>, HandlerError> {
    state
        .services
        .blogs
        .add(request)
        .map(Json)
        .map_err(to_api_error)
}

async fn blogs_update(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
    Json(request): Json<CreateBlogRequest>,
) -> Result<Json<serde_json::Value>, HandlerError> {
    state
        .services
        .blogs
        .update(id, request)
        .map_err(to_api_error)?;
    Ok(Json(serde_json::json!({ "updated": id })))
}

async fn blogs_delete(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> Result<Json<serde_json::Value>, HandlerError> {
    state.services.blogs.delete(id).map_err(to_api_error)?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

async fn pinned_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<PinnedProject>>, HandlerError> {
    state
        .services
        .pinned
        .list()
        .map(Json)
        .map_err(to_api_error)
}

async fn pinned_add(
    State(state): State<AppState>,
    Json(request): Json<CreatePinnedProjectRequest>,
) -> Result<Json<PinnedProject>, HandlerError> {
    state
        .services
        .pinned
        .add(request)
        .map(Json)
        .map_err(to_api_error)
}

async fn pinned_update(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
    Json(request): Json<UpdatePinnedProjectRequest>,
) -> Result<Json<serde_json::Value>, HandlerError> {
    state
        .services
        .pinned
        .update(id, request)
        .map_err(to_api_error)?;
    Ok(Json(serde_json::json!({ "updated": id })))
}

async fn pinned_delete(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> Result<Json<serde_json::Value>, HandlerError> {
    state.services.pinned.delete(id).map_err(to_api_error)?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

async fn config_info(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        github_profile_url: state.config.github.profile_url.clone(),
        github_username: state.config.github.username.clone(),
    })
}

fn resolve_page(query: &PageQuery) -> (u64, u32) {
    let page_no = query.page_no.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(10).clamp(1, 100) as u32;
    (page_no, page_size)
}

fn to_api_error(err: AppError) -> HandlerError {
    let body = ApiError::from(err);
    let status = StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body))
}

fn resolve_dist_dir() -> PathBuf {
    let env_override = std::env::var_os("FOLIO_DIST").map(PathBuf::from);
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(PathBuf::from));
    resolve_dist_dir_with(env_override, exe_dir)
}

fn resolve_dist_dir_with(env_override: Option<PathBuf>, exe_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = env_override {
        return dir;
    }
    if let Some(dir) = exe_dir {
        let candidate = dir.join("dist");
        if candidate.is_dir() {
            return candidate;
        }
    }
    PathBuf::from("frontend/dist")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use folio_app::{GithubConfig, WakaTimeConfig};
    use http::{Request, StatusCode as HttpStatus};
    use http_body_util::BodyExt;
    use std::fs;
    use tower::util::ServiceExt;

    struct TestState {
        state: AppState,
        _dir: tempfile::TempDir,
    }

    // Upstream base URLs point at a closed local port: connection refused,
    // never the real services.
    fn setup_state() -> TestState {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = AppConfig {
            db_path: dir.path().join("test.sqlite"),
            port: 0,
            wakatime: WakaTimeConfig {
                api_key: "test-key".to_string(),
                base_url: "http://127.0.0.1:9".to_string(),
                cooldown_ms: 60_000,
                activity_window_seconds: 600.0,
            },
            github: GithubConfig {
                username: "octocat".to_string(),
                token: None,
                profile_url: "https://github.com/octocat".to_string(),
                base_url: "http://127.0.0.1:9".to_string(),
            },
        };
        let state = AppState::new(config);
        state.initialize().expect("initialize state");
        TestState { state, _dir: dir }
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("parse body")
    }

    #[test]
    fn resolve_dist_dir_prefers_env_override() {
        let dir = tempfile::tempdir().expect("temp dir");
        let resolved = resolve_dist_dir_with(Some(dir.path().to_path_buf()), None);
        assert_eq!(resolved, dir.path());
    }

    #[test]
    fn resolve_dist_dir_uses_exe_dist_when_present() {
        let dir = tempfile::tempdir().expect("temp dir");
        let dist_dir = dir.path().join("dist");
        fs::create_dir_all(&dist_dir).expect("create dist dir");
        let resolved = resolve_dist_dir_with(None, Some(dir.path().to_path_buf()));
        assert_eq!(resolved, dist_dir);
    }

    #[test]
    fn resolve_dist_dir_falls_back_to_repo_dist() {
        let dir = tempfile::tempdir().expect("temp dir");
        let resolved = resolve_dist_dir_with(None, Some(dir.path().to_path_buf()));
        assert_eq!(resolved, PathBuf::from("frontend/dist"));
    }

    #[tokio::test]
    async fn health_endpoint_responds_ok() {
        let test_state = setup_state();
        let app = build_app(test_state.state);
        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), HttpStatus::OK);
    }

    #[tokio::test]
    async fn status_endpoint_survives_unreachable_upstream() {
        let test_state = setup_state();
        let app = build_app(test_state.state);
        let request = Request::builder()
            .uri("/api/status/current")
            .body(Body::empty())
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), HttpStatus::OK);

        let payload = body_json(response).await;
        assert_eq!(payload["isActive"], false);
        assert_eq!(payload["editorName"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn projects_endpoint_maps_upstream_failure_to_bad_gateway() {
        let test_state = setup_state();
        let app = build_app(test_state.state);
        let request = Request::builder()
            .uri("/api/projects?pageNo=1&pageSize=5")
            .body(Body::empty())
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), HttpStatus::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn blog_crud_round_trip() {
        let test_state = setup_state();
        let app = build_app(test_state.state);

        let create = json_request(
            "POST",
            "/api/blogs",
            serde_json::json!({"title": "Hello world", "content": "First post."}),
        );
        let response = app.clone().oneshot(create).await.expect("create response");
        assert_eq!(response.status(), HttpStatus::OK);
        let created = body_json(response).await;
        let id = created["id"].as_i64().expect("post id");
        assert_eq!(created["title"], "Hello world");

        let update = json_request(
            "PUT",
            &format!("/api/blogs/{id}"),
            serde_json::json!({"title": "Hello again", "content": "Edited."}),
        );
        let response = app.clone().oneshot(update).await.expect("update response");
        assert_eq!(response.status(), HttpStatus::OK);

        let list = Request::builder()
            .uri("/api/blogs?pageNo=1&pageSize=10")
            .body(Body::empty())
            .expect("list request");
        let response = app.clone().oneshot(list).await.expect("list response");
        assert_eq!(response.status(), HttpStatus::OK);
        let page = body_json(response).await;
        assert_eq!(page["totalElements"], 1);
        assert_eq!(page["content"][0]["title"], "Hello again");

        let remove = Request::builder()
            .method("DELETE")
            .uri(format!("/api/blogs/{id}"))
            .body(Body::empty())
            .expect("delete request");
        let response = app.clone().oneshot(remove).await.expect("delete response");
        assert_eq!(response.status(), HttpStatus::OK);

        let list = Request::builder()
            .uri("/api/blogs")
            .body(Body::empty())
            .expect("list request");
        let response = app.oneshot(list).await.expect("list response");
        let page = body_json(response).await;
        assert_eq!(page["totalElements"], 0);
        assert_eq!(page["empty"], true);
    }

    #[tokio::test]
    async fn blog_validation_failure_is_bad_request() {
        let test_state = setup_state();
        let app = build_app(test_state.state);
        let create = json_request(
            "POST",
            "/api/blogs",
            serde_json::json!({"title": "Hi", "content": "Too short title."}),
        );
        let response = app.oneshot(create).await.expect("response");
        assert_eq!(response.status(), HttpStatus::BAD_REQUEST);
        let payload = body_json(response).await;
        assert_eq!(payload["code"], "invalid_input");
    }

    #[tokio::test]
    async fn updating_missing_blog_is_not_found() {
        let test_state = setup_state();
        let app = build_app(test_state.state);
        let update = json_request(
            "PUT",
            "/api/blogs/404",
            serde_json::json!({"title": "Valid title", "content": "body"}),
        );
        let response = app.oneshot(update).await.expect("response");
        assert_eq!(response.status(), HttpStatus::NOT_FOUND);
    }

    #[tokio::test]
    async fn pinned_project_crud_round_trip() {
        let test_state = setup_state();
        let app = build_app(test_state.state);

        let create = json_request(
            "POST",
            "/api/pinned-projects/admin/add",
            serde_json::json!({
                "title": "Folio",
                "description": "Portfolio backend",
                "tags": ["rust", "axum"],
                "githubUrl": "https://github.com/octocat/folio"
            }),
        );
        let response = app.clone().oneshot(create).await.expect("create response");
        assert_eq!(response.status(), HttpStatus::OK);
        let created = body_json(response).await;
        let id = created["id"].as_i64().expect("project id");
        assert_eq!(created["tags"][1], "axum");

        let update = json_request(
            "PUT",
            &format!("/api/pinned-projects/admin/update/{id}"),
            serde_json::json!({
                "title": "Folio",
                "description": "Updated description",
                "tags": ["rust"]
            }),
        );
        let response = app.clone().oneshot(update).await.expect("update response");
        assert_eq!(response.status(), HttpStatus::OK);

        let list = Request::builder()
            .uri("/api/pinned-projects")
            .body(Body::empty())
            .expect("list request");
        let response = app.clone().oneshot(list).await.expect("list response");
        let projects = body_json(response).await;
        assert_eq!(projects[0]["description"], "Updated description");
        assert_eq!(projects[0]["githubUrl"], serde_json::Value::Null);

        let remove = Request::builder()
            .method("DELETE")
            .uri(format!("/api/pinned-projects/admin/delete/{id}"))
            .body(Body::empty())
            .expect("delete request");
        let response = app.clone().oneshot(remove).await.expect("delete response");
        assert_eq!(response.status(), HttpStatus::OK);

        let list = Request::builder()
            .uri("/api/pinned-projects")
            .body(Body::empty())
            .expect("list request");
        let response = app.oneshot(list).await.expect("list response");
        let projects = body_json(response).await;
        assert_eq!(projects.as_array().expect("array").len(), 0);
    }

    #[tokio::test]
    async fn config_endpoint_reports_github_identity() {
        let test_state = setup_state();
        let app = build_app(test_state.state);
        let request = Request::builder()
            .uri("/api/config")
            .body(Body::empty())
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), HttpStatus::OK);
        let payload = body_json(response).await;
        assert_eq!(payload["githubUsername"], "octocat");
        assert_eq!(payload["githubProfileUrl"], "https://github.com/octocat");
    }

    #[tokio::test]
    async fn contributions_clear_cache_always_succeeds() {
        let test_state = setup_state();
        let app = build_app(test_state.state);
        let request = Request::builder()
            .method("POST")
            .uri("/api/github/contributions/clear-cache")
            .body(Body::empty())
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), HttpStatus::OK);
        let payload = body_json(response).await;
        assert_eq!(payload["cleared"], true);
    }
}
