use chrono::{DateTime, NaiveDate, Utc};
use ledger_core::{
    DailyUsageEntry, SubmissionBatch, SubmissionSource, SubmitResponse, SubmitResult,
    check_backfill_span, parse_ledger_date,
};
use ledger_db::UsageRecordInput;

use crate::error::{AppError, Result};
use crate::services::{Identity, SharedConfig, open_db};
use crate::title::post_title;
use crate::util::time::{earliest_today, format_timestamp, ledger_today};

struct ValidEntry {
    date: NaiveDate,
    data: DailyUsageEntry,
}

#[derive(Clone)]
pub struct IngestionService {
    config: SharedConfig,
}

impl IngestionService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Validates the whole batch, then writes each day's ledger row and post in order.
    /// Nothing is written when any entry is invalid.
    pub fn submit(
        &self,
        identity: &Identity,
        batch: &SubmissionBatch,
        now: DateTime<Utc>,
    ) -> Result<SubmitResponse> {
        let (source, entries) = validate_batch(
            batch,
            earliest_today(now),
            ledger_today(now),
            self.config.backfill_days,
        )?;

        let mut db = open_db(&self.config)?;
        let timestamp = format_timestamp(now);
        let mut results = Vec::with_capacity(entries.len());
        for entry in &entries {
            let input = UsageRecordInput {
                user_id: identity.user_id.clone(),
                date: entry.data.date.clone(),
                cost_usd: entry.data.cost_usd,
                input_tokens: entry.data.input_tokens,
                output_tokens: entry.data.output_tokens,
                cache_creation_tokens: entry.data.cache_creation_tokens,
                cache_read_tokens: entry.data.cache_read_tokens,
                total_tokens: entry.data.total_tokens,
                models: entry.data.models.clone(),
                model_breakdown: entry.data.model_breakdown.clone().unwrap_or_default(),
                is_verified: source.is_verified(),
                raw_hash: batch.hash.clone(),
            };
            let title = post_title(entry.date, &entry.data);
            let recorded = db.record_daily_usage(&input, &title, &timestamp)?;
            results.push(SubmitResult {
                date: input.date,
                usage_id: recorded.usage_id,
                post_id: recorded.post_id,
                post_url: self.config.post_url(recorded.post_id),
                action: recorded.action,
            });
        }

        tracing::info!(
            user = %identity.user_id,
            entries = results.len(),
            source = source.as_str(),
            hash = batch.hash.as_deref().unwrap_or("-"),
            "usage batch ingested"
        );
        Ok(SubmitResponse { results })
    }
}

fn validate_batch(
    batch: &SubmissionBatch,
    earliest_today: NaiveDate,
    latest_today: NaiveDate,
    window_days: i64,
) -> Result<(SubmissionSource, Vec<ValidEntry>)> {
    if batch.entries.is_empty() {
        return Err(AppError::InvalidInput(
            "entries must not be empty".to_string(),
        ));
    }
    let source = SubmissionSource::parse(&batch.source).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "source must be \"cli\" or \"manual\", got {:?}",
            batch.source
        ))
    })?;

    let mut entries = Vec::with_capacity(batch.entries.len());
    for raw in &batch.entries {
        let date = parse_ledger_date(&raw.date).ok_or_else(|| {
            AppError::InvalidInput(format!("invalid date {:?}: expected YYYY-MM-DD", raw.date))
        })?;
        check_backfill_span(date, earliest_today, latest_today, window_days)?;
        // The batch key is authoritative for the day the numbers belong to.
        let data = DailyUsageEntry {
            date: raw.date.clone(),
            ..raw.data.clone()
        };
        data.validate()?;
        entries.push(ValidEntry { date, data });
    }
    Ok((source, entries))
}
