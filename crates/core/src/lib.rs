use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Oldest day, counted back from today, for which a submission is accepted.
pub const MAX_BACKFILL_DAYS: i64 = 7;

pub const LEDGER_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCost {
    pub model: String,
    pub cost_usd: f64,
}

/// One source's observation for a single calendar day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUsageEntry {
    pub date: String,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub input_tokens: i64,
    #[serde(default)]
    pub output_tokens: i64,
    #[serde(default)]
    pub cache_creation_tokens: i64,
    #[serde(default)]
    pub cache_read_tokens: i64,
    #[serde(default)]
    pub total_tokens: i64,
    #[serde(rename = "costUSD")]
    pub cost_usd: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_breakdown: Option<Vec<ModelCost>>,
}

/// All sources for one date folded together. `model_breakdown` is always populated.
pub type MergedUsageEntry = DailyUsageEntry;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UsageValidationError {
    #[error("entry is missing a date")]
    MissingDate,
    #[error("{date}: costUSD must be a finite number")]
    InvalidCost { date: String },
    #[error("{date}: {field} must not be negative")]
    Negative { date: String, field: &'static str },
}

impl DailyUsageEntry {
    pub fn token_fields(&self) -> [(&'static str, i64); 5] {
        [
            ("inputTokens", self.input_tokens),
            ("outputTokens", self.output_tokens),
            ("cacheCreationTokens", self.cache_creation_tokens),
            ("cacheReadTokens", self.cache_read_tokens),
            ("totalTokens", self.total_tokens),
        ]
    }

    /// Checks the non-negativity invariants shared by the client adapters and the server.
    pub fn validate(&self) -> Result<(), UsageValidationError> {
        if self.date.trim().is_empty() {
            return Err(UsageValidationError::MissingDate);
        }
        if !self.cost_usd.is_finite() {
            return Err(UsageValidationError::InvalidCost {
                date: self.date.clone(),
            });
        }
        if self.cost_usd < 0.0 {
            return Err(UsageValidationError::Negative {
                date: self.date.clone(),
                field: "costUSD",
            });
        }
        for (field, value) in self.token_fields() {
            if value < 0 {
                return Err(UsageValidationError::Negative {
                    date: self.date.clone(),
                    field,
                });
            }
        }
        Ok(())
    }
}

/// Which path produced a batch. Only `Cli` submissions are trusted as verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionSource {
    Cli,
    Manual,
}

impl SubmissionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cli => "cli",
            Self::Manual => "manual",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cli" => Some(Self::Cli),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Cli)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub date: String,
    pub data: DailyUsageEntry,
}

/// Wire payload for `POST /api/usage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionBatch {
    #[serde(default)]
    pub entries: Vec<BatchEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    pub source: String,
}

impl SubmissionBatch {
    pub fn from_merged(entries: &[MergedUsageEntry], hash: String) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|entry| BatchEntry {
                    date: entry.date.clone(),
                    data: entry.clone(),
                })
                .collect(),
            hash: Some(hash),
            source: SubmissionSource::Cli.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestAction {
    Created,
    Updated,
}

impl IngestAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResult {
    pub date: String,
    pub usage_id: i64,
    pub post_id: i64,
    pub post_url: String,
    pub action: IngestAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub results: Vec<SubmitResult>,
}

/// Server-owned ledger row, one per (user, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub id: i64,
    pub user_id: String,
    pub date: String,
    pub cost_usd: f64,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub cache_creation_tokens: i64,
    pub cache_read_tokens: i64,
    pub total_tokens: i64,
    pub models: Vec<String>,
    pub model_breakdown: Vec<ModelCost>,
    pub is_verified: bool,
    pub raw_hash: Option<String>,
    pub revision: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// User-editable post linked 1:1 to a ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub usage_id: i64,
    pub user_id: String,
    pub title: String,
    pub body: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_ledger_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, LEDGER_DATE_FORMAT).ok()
}

pub fn format_ledger_date(date: NaiveDate) -> String {
    date.format(LEDGER_DATE_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateRejection {
    #[error("date {date} is in the future")]
    Future { date: NaiveDate },
    #[error("date {date} is outside the {window_days}-day backfill window")]
    TooOld { date: NaiveDate, window_days: i64 },
}

/// Accepts `today - window_days ..= today`.
pub fn check_backfill(
    date: NaiveDate,
    today: NaiveDate,
    window_days: i64,
) -> Result<(), DateRejection> {
    check_backfill_span(date, today, today, window_days)
}

/// Accepts `earliest_today - window_days ..= latest_today`, for callers that cannot know the
/// submitter's timezone and must honour every "today" currently in effect.
pub fn check_backfill_span(
    date: NaiveDate,
    earliest_today: NaiveDate,
    latest_today: NaiveDate,
    window_days: i64,
) -> Result<(), DateRejection> {
    if date > latest_today {
        return Err(DateRejection::Future { date });
    }
    if date < earliest_today - Duration::days(window_days) {
        return Err(DateRejection::TooOld { date, window_days });
    }
    Ok(())
}
