use ledger_core::{IngestAction, ModelCost};

/// Column values for one ledger upsert.
#[derive(Debug, Clone)]
pub struct UsageRecordInput {
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
}

/// Outcome of writing one day's ledger row and its post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedUsage {
    pub usage_id: i64,
    pub post_id: i64,
    pub action: IngestAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageTotalsForUser {
    pub days: u64,
    pub cost_usd: f64,
}
