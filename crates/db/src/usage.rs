use ledger_core::{IngestAction, UsageRecord};
use rusqlite::{Connection, OptionalExtension, params};

use crate::Db;
use crate::error::Result;
use crate::helpers::{USAGE_RECORD_COLUMNS, row_to_usage_record};
use crate::posts::upsert_post_row;
use crate::types::{RecordedUsage, UsageRecordInput, UsageTotalsForUser};

/// Inserts or overwrites the (user, date) row. Returns the row id and its revision,
/// which is 1 only right after an insert.
fn upsert_usage_row(conn: &Connection, input: &UsageRecordInput, now: &str) -> Result<(i64, i64)> {
    let models = serde_json::to_string(&input.models)?;
    let breakdown = serde_json::to_string(&input.model_breakdown)?;
    let (id, revision) = conn.query_row(
        r#"
        INSERT INTO usage_record (
          user_id, date, cost_usd, input_tokens, output_tokens, cache_creation_tokens,
          cache_read_tokens, total_tokens, models, model_breakdown, is_verified, raw_hash,
          revision, created_at, updated_at
        ) VALUES (
          ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 1, ?13, ?13
        )
        ON CONFLICT(user_id, date) DO UPDATE SET
          cost_usd = excluded.cost_usd,
          input_tokens = excluded.input_tokens,
          output_tokens = excluded.output_tokens,
          cache_creation_tokens = excluded.cache_creation_tokens,
          cache_read_tokens = excluded.cache_read_tokens,
          total_tokens = excluded.total_tokens,
          models = excluded.models,
          model_breakdown = excluded.model_breakdown,
          is_verified = excluded.is_verified,
          raw_hash = excluded.raw_hash,
          revision = usage_record.revision + 1,
          updated_at = excluded.updated_at
        RETURNING id, revision
        "#,
        params![
            input.user_id,
            input.date,
            input.cost_usd,
            input.input_tokens,
            input.output_tokens,
            input.cache_creation_tokens,
            input.cache_read_tokens,
            input.total_tokens,
            models,
            breakdown,
            input.is_verified as i64,
            input.raw_hash,
            now,
        ],
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
    )?;
    Ok((id, revision))
}

impl Db {
    /// Writes the ledger row and its linked post in one transaction.
    /// `post_title` is only used when the post does not exist yet.
    pub fn record_daily_usage(
        &mut self,
        input: &UsageRecordInput,
        post_title: &str,
        now: &str,
    ) -> Result<RecordedUsage> {
        let tx = self.conn.transaction()?;
        let (usage_id, revision) = upsert_usage_row(&tx, input, now)?;
        let post_id = upsert_post_row(&tx, usage_id, &input.user_id, post_title, now)?;
        tx.commit()?;
        let action = if revision == 1 {
            IngestAction::Created
        } else {
            IngestAction::Updated
        };
        Ok(RecordedUsage {
            usage_id,
            post_id,
            action,
        })
    }

    pub fn get_usage_record(&self, user_id: &str, date: &str) -> Result<Option<UsageRecord>> {
        let sql = format!(
            "SELECT {USAGE_RECORD_COLUMNS} FROM usage_record WHERE user_id = ?1 AND date = ?2"
        );
        Ok(self
            .conn
            .query_row(&sql, params![user_id, date], row_to_usage_record)
            .optional()?)
    }

    pub fn list_usage_records(&self, user_id: &str) -> Result<Vec<UsageRecord>> {
        let sql = format!(
            "SELECT {USAGE_RECORD_COLUMNS} FROM usage_record WHERE user_id = ?1 ORDER BY date ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], row_to_usage_record)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn usage_totals_for_user(&self, user_id: &str) -> Result<UsageTotalsForUser> {
        let totals = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(cost_usd), 0) FROM usage_record WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok(UsageTotalsForUser {
                    days: row.get::<_, i64>(0)?.max(0) as u64,
                    cost_usd: row.get(1)?,
                })
            },
        )?;
        Ok(totals)
    }
}
