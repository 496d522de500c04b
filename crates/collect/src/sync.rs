use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, SecondsFormat, Utc};
use ledger_core::{
    MAX_BACKFILL_DAYS, MergedUsageEntry, SubmissionBatch, SubmitResult, parse_ledger_date,
};
use serde::{Deserialize, Serialize};

use crate::client::Submitter;
use crate::digest::payload_digest;
use crate::error::{CollectError, SyncError};
use crate::merge::merge_entries;
use crate::range::{DateRange, resolve_range};
use crate::sources::SourceAdapter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushOptions {
    pub date: Option<NaiveDate>,
    pub days: Option<u32>,
    pub dry_run: bool,
}

/// Merged entries for a range and the digest of the raw payloads behind them.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedUsage {
    pub entries: Vec<MergedUsageEntry>,
    pub hash: String,
    pub secondary_ok: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PushReport {
    pub range: DateRange,
    pub entries: Vec<MergedUsageEntry>,
    pub hash: String,
    /// `None` for dry runs and empty ranges.
    pub results: Option<Vec<SubmitResult>>,
}

/// Local record of the last successful push.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncState {
    pub last_pushed_date: Option<String>,
    pub pushed_at: Option<String>,
}

impl SyncState {
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .map_err(|err| SyncError::State(format!("read {}: {}", path.display(), err)))?;
        serde_json::from_str(&contents)
            .map_err(|err| SyncError::State(format!("parse {}: {}", path.display(), err)))
    }

    pub fn save(&self, path: &Path) -> Result<(), SyncError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|err| SyncError::State(format!("create {}: {}", dir.display(), err)))?;
        }
        let contents = serde_json::to_string_pretty(self)
            .map_err(|err| SyncError::State(format!("serialize sync state: {}", err)))?;
        fs::write(path, contents)
            .map_err(|err| SyncError::State(format!("write {}: {}", path.display(), err)))
    }
}

pub struct SyncClient<S> {
    primary: SourceAdapter,
    secondary: SourceAdapter,
    submitter: S,
    state_path: PathBuf,
    today: NaiveDate,
    window_days: i64,
}

impl<S: Submitter> SyncClient<S> {
    pub fn new(
        primary: SourceAdapter,
        secondary: SourceAdapter,
        submitter: S,
        state_path: PathBuf,
        today: NaiveDate,
    ) -> Self {
        Self {
            primary,
            secondary,
            submitter,
            state_path,
            today,
            window_days: MAX_BACKFILL_DAYS,
        }
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    /// Runs both reporters concurrently. A primary failure returns at once and drops
    /// (and kills) the secondary; a secondary failure only removes its data.
    pub async fn collect(&self, range: &DateRange) -> Result<CollectedUsage, CollectError> {
        let secondary_tool = self.secondary.tool().name();
        let (primary, secondary) = tokio::try_join!(self.primary.fetch(range), async {
            match self.secondary.fetch(range).await {
                Ok(output) => Ok::<_, CollectError>(Some(output)),
                Err(err) => {
                    tracing::debug!(tool = secondary_tool, error = %err, "optional source skipped");
                    Ok(None)
                }
            }
        })?;

        let secondary_entries = secondary
            .as_ref()
            .map(|output| output.entries.as_slice())
            .unwrap_or_default();
        let entries = merge_entries(&primary.entries, secondary_entries)
            .into_iter()
            .filter(|entry| {
                parse_ledger_date(&entry.date).is_some_and(|day| range.contains(day))
            })
            .collect();
        let hash = payload_digest(
            &primary.raw,
            secondary.as_ref().map(|output| output.raw.as_str()),
        );
        Ok(CollectedUsage {
            entries,
            hash,
            secondary_ok: secondary.is_some(),
        })
    }

    pub async fn push(
        &self,
        options: PushOptions,
        out: &mut impl Write,
    ) -> Result<PushReport, SyncError> {
        let range = resolve_range(options.date, options.days, self.today, self.window_days)?;
        let collected = self.collect(&range).await?;
        write_summary(out, &range, &collected.entries);

        let mut report = PushReport {
            range,
            entries: collected.entries,
            hash: collected.hash,
            results: None,
        };
        if options.dry_run || report.entries.is_empty() {
            return Ok(report);
        }

        let batch = SubmissionBatch::from_merged(&report.entries, report.hash.clone());
        let response = self.submitter.submit(&batch).await?;

        for result in &response.results {
            let _ = writeln!(
                out,
                "{} {} -> {}",
                result.action.as_str(),
                result.date,
                result.post_url
            );
        }

        // Rows are already stored server-side; a failed local save only warns.
        let state = SyncState {
            last_pushed_date: report.entries.iter().map(|entry| entry.date.clone()).max(),
            pushed_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        };
        if let Err(err) = state.save(&self.state_path) {
            tracing::warn!(
                path = %self.state_path.display(),
                error = %err,
                "could not record last pushed date"
            );
        }
        report.results = Some(response.results);
        Ok(report)
    }
}

pub fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn write_summary(out: &mut impl Write, range: &DateRange, entries: &[MergedUsageEntry]) {
    if entries.is_empty() {
        let _ = writeln!(out, "No usage found for {} to {}.", range.since, range.until);
        return;
    }
    for entry in entries {
        let mut models: Vec<&str> = Vec::new();
        for model in &entry.models {
            if !models.contains(&model.as_str()) {
                models.push(model);
            }
        }
        let _ = writeln!(
            out,
            "{}  ${:.2}  {} tokens (in {} / out {} / cache write {} / cache read {})  {}",
            entry.date,
            entry.cost_usd,
            format_count(entry.total_tokens),
            format_count(entry.input_tokens),
            format_count(entry.output_tokens),
            format_count(entry.cache_creation_tokens),
            format_count(entry.cache_read_tokens),
            if models.is_empty() {
                "-".to_string()
            } else {
                models.join(", ")
            }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_count_groups_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(4300), "4,300");
        assert_eq!(format_count(1_234_567), "1,234,567");
        assert_eq!(format_count(-1200), "-1,200");
    }

    #[test]
    fn sync_state_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested/sync-state.json");
        assert_eq!(SyncState::load(&path).expect("missing"), SyncState::default());

        let state = SyncState {
            last_pushed_date: Some("2025-06-01".to_string()),
            pushed_at: Some("2025-06-01T10:00:00Z".to_string()),
        };
        state.save(&path).expect("save");
        assert_eq!(SyncState::load(&path).expect("load"), state);
    }
}
