use chrono::NaiveDate;
use ledger_core::DailyUsageEntry;

/// Most specific prefix first.
const FRIENDLY_MODELS: &[(&str, &str)] = &[
    ("claude-opus-4-1", "Opus 4.1"),
    ("claude-opus-4", "Opus 4"),
    ("claude-sonnet-4-5", "Sonnet 4.5"),
    ("claude-sonnet-4", "Sonnet 4"),
    ("claude-3-7-sonnet", "Sonnet 3.7"),
    ("claude-3-5-sonnet", "Sonnet 3.5"),
    ("claude-3-5-haiku", "Haiku 3.5"),
    ("gpt-5-codex", "GPT-5 Codex"),
    ("gpt-5-mini", "GPT-5 mini"),
    ("gpt-5", "GPT-5"),
];

pub fn friendly_model_name(model: &str) -> String {
    FRIENDLY_MODELS
        .iter()
        .find(|(prefix, _)| {
            model == *prefix
                || model
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('-'))
        })
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| model.to_string())
}

fn lead_model(entry: &DailyUsageEntry) -> Option<&str> {
    let mut lead: Option<(&str, f64)> = None;
    for item in entry.model_breakdown.iter().flatten() {
        if lead.is_none_or(|(_, cost)| item.cost_usd > cost) {
            lead = Some((item.model.as_str(), item.cost_usd));
        }
    }
    lead.map(|(model, _)| model)
        .or_else(|| entry.models.first().map(String::as_str))
}

/// Auto-generated title for a new post, e.g. `Jun 1 · Opus 4.1 +1 · $13.00`.
pub fn post_title(date: NaiveDate, entry: &DailyUsageEntry) -> String {
    let mut parts = vec![date.format("%b %-d").to_string()];

    if let Some(lead) = lead_model(entry) {
        let mut distinct: Vec<&str> = Vec::new();
        for model in &entry.models {
            if model != lead && !distinct.contains(&model.as_str()) {
                distinct.push(model);
            }
        }
        let mut label = friendly_model_name(lead);
        if !distinct.is_empty() {
            label.push_str(&format!(" +{}", distinct.len()));
        }
        parts.push(label);
    }

    if entry.cost_usd > 0.0 {
        parts.push(format!("${:.2}", entry.cost_usd));
    }
    parts.join(" · ")
}
