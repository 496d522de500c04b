use rusqlite::{OptionalExtension, params};

use crate::Db;
use crate::error::Result;
use crate::types::SessionIdentity;

impl Db {
    pub fn create_session(
        &self,
        token: &str,
        user_id: &str,
        username: Option<&str>,
        expires_at: &str,
    ) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO web_session (token, user_id, username, expires_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(token) DO UPDATE SET
              user_id = excluded.user_id,
              username = excluded.username,
              expires_at = excluded.expires_at
            "#,
            params![token, user_id, username, expires_at],
        )?;
        Ok(())
    }

    /// Timestamps are RFC 3339 UTC strings, so lexical order is chronological.
    pub fn session_identity(&self, token: &str, now: &str) -> Result<Option<SessionIdentity>> {
        Ok(self
            .conn
            .query_row(
                "SELECT user_id, username FROM web_session WHERE token = ?1 AND expires_at > ?2",
                params![token, now],
                |row| {
                    Ok(SessionIdentity {
                        user_id: row.get(0)?,
                        username: row.get(1)?,
                    })
                },
            )
            .optional()?)
    }

    pub fn delete_expired_sessions(&self, now: &str) -> Result<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM web_session WHERE expires_at <= ?1", params![now])?)
    }
}
