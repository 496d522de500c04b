use ledger_core::{DailyUsageEntry, ModelCost};
use serde::Deserialize;

use super::{normalize_date, require_cost, require_date};
use crate::error::{CollectError, Result};

#[derive(Deserialize)]
#[serde(untagged)]
enum DailyReport {
    Bare(Vec<ClaudeDay>),
    Wrapped { daily: Vec<ClaudeDay> },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaudeDay {
    date: Option<String>,
    #[serde(default)]
    input_tokens: i64,
    #[serde(default)]
    output_tokens: i64,
    #[serde(default)]
    cache_creation_tokens: i64,
    #[serde(default)]
    cache_read_tokens: i64,
    total_tokens: Option<i64>,
    total_cost: Option<f64>,
    #[serde(rename = "costUSD")]
    cost_usd: Option<f64>,
    #[serde(default)]
    models_used: Vec<String>,
    model_breakdowns: Option<Vec<ClaudeModelCost>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaudeModelCost {
    model_name: String,
    cost: f64,
}

pub(super) fn parse_daily(tool: &'static str, raw: &str) -> Result<Vec<DailyUsageEntry>> {
    let report: DailyReport =
        serde_json::from_str(raw.trim()).map_err(|source| CollectError::Json { tool, source })?;
    let days = match report {
        DailyReport::Bare(days) | DailyReport::Wrapped { daily: days } => days,
    };
    days.into_iter().map(|day| to_entry(tool, day)).collect()
}

fn to_entry(tool: &'static str, day: ClaudeDay) -> Result<DailyUsageEntry> {
    let date = normalize_date(tool, &require_date(tool, day.date)?)?;
    let cost_usd = require_cost(tool, &date, day.total_cost.or(day.cost_usd))?;
    let total_tokens = day.total_tokens.unwrap_or(
        day.input_tokens + day.output_tokens + day.cache_creation_tokens + day.cache_read_tokens,
    );
    let model_breakdown = day
        .model_breakdowns
        .filter(|breakdowns| !breakdowns.is_empty())
        .map(|breakdowns| {
            breakdowns
                .into_iter()
                .map(|item| ModelCost {
                    model: item.model_name,
                    cost_usd: item.cost,
                })
                .collect()
        });
    Ok(DailyUsageEntry {
        date,
        models: day.models_used,
        input_tokens: day.input_tokens,
        output_tokens: day.output_tokens,
        cache_creation_tokens: day.cache_creation_tokens,
        cache_read_tokens: day.cache_read_tokens,
        total_tokens,
        cost_usd,
        model_breakdown,
    })
}
