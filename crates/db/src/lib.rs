use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row, params};

use folio_core::{BlogPost, PinnedProject};

pub const MIGRATION_0001: &str = include_str!("../migrations/0001_init.sql");

pub const MIGRATIONS: &[(&str, &str)] = &[("0001_init", MIGRATION_0001)];

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("tag encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self { conn })
    }

    pub fn migrate(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        for (_name, sql) in MIGRATIONS {
            tx.execute_batch(sql)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn list_blog_posts(&self, limit: u32, offset: u64) -> Result<Vec<BlogPost>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, title, content, created_date
            FROM blog_post
            ORDER BY created_date DESC, id DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )?;
        let rows = stmt
            .query_map(params![limit, offset as i64], row_to_blog_post)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count_blog_posts(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM blog_post", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn get_blog_post(&self, id: i64) -> Result<Option<BlogPost>> {
        self.conn
            .query_row(
                "SELECT id, title, content, created_date FROM blog_post WHERE id = ?1",
                params![id],
                row_to_blog_post,
            )
            .optional()
            .map_err(DbError::from)
    }

    pub fn insert_blog_post(
        &self,
        title: &str,
        content: &str,
        created_date: &str,
    ) -> Result<BlogPost> {
        self.conn.execute(
            "INSERT INTO blog_post (title, content, created_date) VALUES (?1, ?2, ?3)",
            params![title, content, created_date],
        )?;
        let id = self.conn.last_insert_rowid();
        Ok(BlogPost {
            id,
            title: title.to_string(),
            content: content.to_string(),
            created_date: created_date.to_string(),
        })
    }

    pub fn update_blog_post(&self, id: i64, title: &str, content: &str) -> Result<bool> {
        let updated = self.conn.execute(
            "UPDATE blog_post SET title = ?1, content = ?2 WHERE id = ?3",
            params![title, content, id],
        )?;
        Ok(updated > 0)
    }

    pub fn delete_blog_post(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM blog_post WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    pub fn list_pinned_projects(&self) -> Result<Vec<PinnedProject>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, title, description, tags, github_url
            FROM pinned_project
            ORDER BY id ASC
            "#,
        )?;
        let rows = stmt
            .query_map([], row_to_pinned_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(pinned_from_row).collect()
    }

    pub fn get_pinned_project(&self, id: i64) -> Result<Option<PinnedProject>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, title, description, tags, github_url FROM pinned_project WHERE id = ?1",
                params![id],
                row_to_pinned_row,
            )
            .optional()?;
        row.map(pinned_from_row).transpose()
    }

    pub fn insert_pinned_project(
        &self,
        title: &str,
        description: &str,
        tags: &[String],
        github_url: Option<&str>,
    ) -> Result<PinnedProject> {
        let tags_json = serde_json::to_string(tags)?;
        self.conn.execute(
            r#"
            INSERT INTO pinned_project (title, description, tags, github_url)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![title, description, tags_json, github_url],
        )?;
        let id = self.conn.last_insert_rowid();
        Ok(PinnedProject {
            id,
            title: title.to_string(),
            description: description.to_string(),
            tags: tags.to_vec(),
            github_url: github_url.map(str::to_string),
        })
    }

    pub fn update_pinned_project(
        &self,
        id: i64,
        title: &str,
        description: &str,
        tags: &[String],
        github_url: Option<&str>,
    ) -> Result<bool> {
        let tags_json = serde_json::to_string(tags)?;
        let updated = self.conn.execute(
            r#"
            UPDATE pinned_project
            SET title = ?1, description = ?2, tags = ?3, github_url = ?4
            WHERE id = ?5
            "#,
            params![title, description, tags_json, github_url, id],
        )?;
        Ok(updated > 0)
    }

    pub fn delete_pinned_project(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM pinned_project WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

fn row_to_blog_post(row: &Row<'_>) -> std::result::Result<BlogPost, rusqlite::Error> {
    Ok(BlogPost {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        created_date: row.get(3)?,
    })
}

struct PinnedRow {
    id: i64,
    title: String,
    description: String,
    tags_json: String,
    github_url: Option<String>,
}

fn row_to_pinned_row(row: &Row<'_>) -> std::result::Result<PinnedRow, rusqlite::Error> {
    Ok(PinnedRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        tags_json: row.get(3)?,
        github_url: row.get(4)?,
    })
}

fn pinned_from_row(row: PinnedRow) -> Result<PinnedProject> {
    let tags: Vec<String> = serde_json::from_str(&row.tags_json)?;
    Ok(PinnedProject {
        id: row.id,
        title: row.title,
        description: row.description,
        tags,
        github_url: row.github_url,
    })
}
