use chrono::Utc;
use serde::Deserialize;

use folio_core::{BlogPost, Page};
use folio_db::Db;

use crate::error::{AppError, Result};
use crate::services::{SharedConfig, open_db};

const TITLE_MIN_LEN: usize = 5;
const TITLE_MAX_LEN: usize = 250;
const CONTENT_MAX_LEN: usize = 2000;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlogRequest {
    pub title: String,
    pub content: String,
}

#[derive(Clone)]
pub struct BlogsService {
    config: SharedConfig,
}

impl BlogsService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    pub fn page(&self, page_no: u64, page_size: u32) -> Result<Page<BlogPost>> {
        let db = self.db()?;
        let total = db.count_blog_posts()?;
        let offset = page_no.saturating_sub(1).saturating_mul(page_size as u64);
        let posts = db.list_blog_posts(page_size, offset)?;
        Ok(Page::new(posts, page_no, page_size as u64, total))
    }

    pub fn add(&self, request: CreateBlogRequest) -> Result<BlogPost> {
        let request = validate(request)?;
        let created_date = Utc::now().format("%Y-%m-%d").to_string();
        Ok(self
            .db()?
            .insert_blog_post(&request.title, &request.content, &created_date)?)
    }

    pub fn update(&self, id: i64, request: CreateBlogRequest) -> Result<()> {
        let request = validate(request)?;
        let updated = self
            .db()?
            .update_blog_post(id, &request.title, &request.content)?;
        if updated {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("blog post {id} not found")))
        }
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        if self.db()?.delete_blog_post(id)? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("blog post {id} not found")))
        }
    }
}

fn validate(request: CreateBlogRequest) -> Result<CreateBlogRequest> {
    let title = request.title.trim().to_string();
    if title.len() < TITLE_MIN_LEN || title.len() > TITLE_MAX_LEN {
        return Err(AppError::InvalidInput(format!(
            "title must be {TITLE_MIN_LEN} to {TITLE_MAX_LEN} characters"
        )));
    }
    if request.content.trim().is_empty() || request.content.len() > CONTENT_MAX_LEN {
        return Err(AppError::InvalidInput(format!(
            "content must be 1 to {CONTENT_MAX_LEN} characters"
        )));
    }
    Ok(CreateBlogRequest {
        title,
        content: request.content,
    })
}
