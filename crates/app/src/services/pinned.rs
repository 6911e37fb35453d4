use serde::Deserialize;

use folio_core::PinnedProject;
use folio_db::Db;

use crate::error::{AppError, Result};
use crate::services::{SharedConfig, open_db};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePinnedProjectRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub github_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePinnedProjectRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub github_url: Option<String>,
}

#[derive(Clone)]
pub struct PinnedProjectsService {
    config: SharedConfig,
}

impl PinnedProjectsService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    pub fn list(&self) -> Result<Vec<PinnedProject>> {
        Ok(self.db()?.list_pinned_projects()?)
    }

    pub fn add(&self, request: CreatePinnedProjectRequest) -> Result<PinnedProject> {
        let (title, description) = validate(&request.title, &request.description)?;
        Ok(self.db()?.insert_pinned_project(
            &title,
            &description,
            &request.tags,
            request.github_url.as_deref(),
        )?)
    }

    pub fn update(&self, id: i64, request: UpdatePinnedProjectRequest) -> Result<()> {
        let (title, description) = validate(&request.title, &request.description)?;
        let updated = self.db()?.update_pinned_project(
            id,
            &title,
            &description,
            &request.tags,
            request.github_url.as_deref(),
        )?;
        if updated {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("pinned project {id} not found")))
        }
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        if self.db()?.delete_pinned_project(id)? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("pinned project {id} not found")))
        }
    }
}

fn validate(title: &str, description: &str) -> Result<(String, String)> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("title is required".to_string()));
    }
    let description = description.trim();
    if description.is_empty() {
        return Err(AppError::InvalidInput(
            "description is required".to_string(),
        ));
    }
    Ok((title.to_string(), description.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::test_state;

    #[test]
    fn add_list_update_delete_round_trip() {
        let (state, _dir) = test_state();
        let pinned = &state.services.pinned;

        let project = pinned
            .add(CreatePinnedProjectRequest {
                title: "Folio".to_string(),
                description: "Portfolio backend".to_string(),
                tags: vec!["rust".to_string()],
                github_url: Some("https://github.com/example/folio".to_string()),
            })
            .expect("add project");

        let listed = pinned.list().expect("list projects");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].tags, vec!["rust".to_string()]);

        pinned
            .update(
                project.id,
                UpdatePinnedProjectRequest {
                    title: "Folio".to_string(),
                    description: "Updated".to_string(),
                    tags: vec!["rust".to_string(), "axum".to_string()],
                    github_url: None,
                },
            )
            .expect("update project");

        let listed = pinned.list().expect("list projects");
        assert_eq!(listed[0].description, "Updated");
        assert_eq!(listed[0].tags.len(), 2);
        assert_eq!(listed[0].github_url, None);

        pinned.delete(project.id).expect("delete project");
        assert!(pinned.list().expect("list projects").is_empty());
    }

    #[test]
    fn rejects_blank_title() {
        let (state, _dir) = test_state();
        let result = state.services.pinned.add(CreatePinnedProjectRequest {
            title: "   ".to_string(),
            description: "desc".to_string(),
            ..CreatePinnedProjectRequest::default()
        });
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn update_missing_project_is_not_found() {
        let (state, _dir) = test_state();
        let result = state.services.pinned.update(
            7,
            UpdatePinnedProjectRequest {
                title: "Title".to_string(),
                description: "desc".to_string(),
                ..UpdatePinnedProjectRequest::default()
            },
        );
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
