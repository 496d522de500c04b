use ledger_core::Post;
use rusqlite::{Connection, OptionalExtension, params};

use crate::Db;
use crate::error::Result;
use crate::helpers::{POST_COLUMNS, row_to_post};

/// Creates the post for `usage_id`, or only refreshes `updated_at` when it already exists.
/// Title and body are never touched on conflict.
pub(crate) fn upsert_post_row(
    conn: &Connection,
    usage_id: i64,
    user_id: &str,
    title: &str,
    now: &str,
) -> Result<i64> {
    let id = conn.query_row(
        r#"
        INSERT INTO post (usage_id, user_id, title, body, created_at, updated_at)
        VALUES (?1, ?2, ?3, NULL, ?4, ?4)
        ON CONFLICT(usage_id) DO UPDATE SET updated_at = excluded.updated_at
        RETURNING id
        "#,
        params![usage_id, user_id, title, now],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(id)
}

impl Db {
    pub fn get_post(&self, post_id: i64) -> Result<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM post WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![post_id], row_to_post)
            .optional()?)
    }

    pub fn get_post_for_usage(&self, usage_id: i64) -> Result<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM post WHERE usage_id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![usage_id], row_to_post)
            .optional()?)
    }

    pub fn count_posts(&self, user_id: &str) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM post WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    /// User edit of a post. Returns false when the post does not exist.
    pub fn update_post(
        &self,
        post_id: i64,
        title: &str,
        body: Option<&str>,
        now: &str,
    ) -> Result<bool> {
        let updated = self.conn.execute(
            "UPDATE post SET title = ?2, body = ?3, updated_at = ?4 WHERE id = ?1",
            params![post_id, title, body, now],
        )?;
        Ok(updated > 0)
    }
}
