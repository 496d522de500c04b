use std::collections::BTreeMap;

use ledger_core::{DailyUsageEntry, MergedUsageEntry, ModelCost};

/// The source's own breakdown, or an even split of its cost across its models.
pub fn breakdown_for(entry: &DailyUsageEntry) -> Vec<ModelCost> {
    if let Some(breakdown) = &entry.model_breakdown {
        return breakdown.clone();
    }
    if entry.cost_usd == 0.0 || entry.models.is_empty() {
        return Vec::new();
    }
    let share = entry.cost_usd / entry.models.len() as f64;
    entry
        .models
        .iter()
        .map(|model| ModelCost {
            model: model.clone(),
            cost_usd: share,
        })
        .collect()
}

fn fold_into(target: &mut MergedUsageEntry, entry: &DailyUsageEntry) {
    target.input_tokens += entry.input_tokens;
    target.output_tokens += entry.output_tokens;
    target.cache_creation_tokens += entry.cache_creation_tokens;
    target.cache_read_tokens += entry.cache_read_tokens;
    target.total_tokens += entry.total_tokens;
    target.cost_usd += entry.cost_usd;
    target.models.extend(entry.models.iter().cloned());
    target
        .model_breakdown
        .get_or_insert_with(Vec::new)
        .extend(breakdown_for(entry));
}

/// One entry per date present in either input, ascending by date. Primary data always
/// comes first within a date, so the result does not depend on input ordering.
pub fn merge_entries(
    primary: &[DailyUsageEntry],
    secondary: &[DailyUsageEntry],
) -> Vec<MergedUsageEntry> {
    let mut by_date: BTreeMap<&str, MergedUsageEntry> = BTreeMap::new();
    for entry in primary.iter().chain(secondary) {
        let merged = by_date
            .entry(entry.date.as_str())
            .or_insert_with(|| MergedUsageEntry {
                date: entry.date.clone(),
                model_breakdown: Some(Vec::new()),
                ..Default::default()
            });
        fold_into(merged, entry);
    }
    by_date.into_values().collect()
}
