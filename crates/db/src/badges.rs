use rusqlite::params;

use crate::Db;
use crate::error::Result;

impl Db {
    /// Returns true when the badge was newly awarded.
    pub fn award_badge(&self, user_id: &str, badge: &str, now: &str) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO user_badge (user_id, badge, awarded_at) VALUES (?1, ?2, ?3)",
            params![user_id, badge, now],
        )?;
        Ok(inserted > 0)
    }

    pub fn list_badges(&self, user_id: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT badge FROM user_badge WHERE user_id = ?1 ORDER BY awarded_at, badge")?;
        let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}
