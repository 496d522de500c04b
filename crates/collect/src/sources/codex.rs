use std::collections::BTreeMap;

use ledger_core::{DailyUsageEntry, UsageValidationError};
use serde::Deserialize;
use serde_json::Value;

use super::{normalize_date, require_cost, require_date};
use crate::error::{CollectError, Result};

#[derive(Deserialize)]
#[serde(untagged)]
enum DailyReport {
    Bare(Vec<CodexDay>),
    Wrapped { daily: Vec<CodexDay> },
}

/// Older reporter versions list models as an array, newer ones as an object keyed by id.
#[derive(Deserialize)]
#[serde(untagged)]
enum CodexModels {
    Keyed(BTreeMap<String, Value>),
    Listed(Vec<String>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodexDay {
    date: Option<String>,
    #[serde(default)]
    input_tokens: i64,
    #[serde(default)]
    cached_input_tokens: i64,
    #[serde(default)]
    output_tokens: i64,
    total_tokens: Option<i64>,
    #[serde(rename = "costUSD")]
    cost_usd: Option<f64>,
    models: Option<CodexModels>,
}

pub(super) fn parse_daily(tool: &'static str, raw: &str) -> Result<Vec<DailyUsageEntry>> {
    let report: DailyReport =
        serde_json::from_str(raw.trim()).map_err(|source| CollectError::Json { tool, source })?;
    let days = match report {
        DailyReport::Bare(days) | DailyReport::Wrapped { daily: days } => days,
    };
    days.into_iter().map(|day| to_entry(tool, day)).collect()
}

fn to_entry(tool: &'static str, day: CodexDay) -> Result<DailyUsageEntry> {
    let date = normalize_date(tool, &require_date(tool, day.date)?)?;
    let cost_usd = require_cost(tool, &date, day.cost_usd)?;
    for (field, value) in [
        ("inputTokens", day.input_tokens),
        ("cachedInputTokens", day.cached_input_tokens),
    ] {
        if value < 0 {
            return Err(CollectError::Invalid {
                tool,
                source: UsageValidationError::Negative {
                    date: date.clone(),
                    field,
                },
            });
        }
    }
    // Cached input is a subset of input; report it only once, as cache reads.
    let input_tokens = (day.input_tokens - day.cached_input_tokens).max(0);
    let total_tokens = day
        .total_tokens
        .unwrap_or(day.input_tokens + day.output_tokens);
    let models = match day.models {
        Some(CodexModels::Keyed(models)) => models.into_keys().collect(),
        Some(CodexModels::Listed(models)) => models,
        None => Vec::new(),
    };
    Ok(DailyUsageEntry {
        date,
        models,
        input_tokens,
        output_tokens: day.output_tokens,
        cache_creation_tokens: 0,
        cache_read_tokens: day.cached_input_tokens,
        total_tokens,
        cost_usd,
        model_breakdown: None,
    })
}
