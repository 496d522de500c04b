use ledger_core::{ModelCost, Post, UsageRecord};
use rusqlite::Row;
use rusqlite::types::Type;

fn json_column<T: serde::de::DeserializeOwned>(
    row: &Row<'_>,
    index: usize,
) -> std::result::Result<T, rusqlite::Error> {
    let raw: String = row.get(index)?;
    serde_json::from_str(&raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err)))
}

pub(crate) const USAGE_RECORD_COLUMNS: &str = "id, user_id, date, cost_usd, input_tokens, output_tokens, \
     cache_creation_tokens, cache_read_tokens, total_tokens, models, model_breakdown, \
     is_verified, raw_hash, revision, created_at, updated_at";

pub(crate) fn row_to_usage_record(
    row: &Row<'_>,
) -> std::result::Result<UsageRecord, rusqlite::Error> {
    let models: Vec<String> = json_column(row, 9)?;
    let model_breakdown: Vec<ModelCost> = json_column(row, 10)?;
    Ok(UsageRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: row.get(2)?,
        cost_usd: row.get(3)?,
        input_tokens: row.get(4)?,
        output_tokens: row.get(5)?,
        cache_creation_tokens: row.get(6)?,
        cache_read_tokens: row.get(7)?,
        total_tokens: row.get(8)?,
        models,
        model_breakdown,
        is_verified: row.get::<_, i64>(11)? != 0,
        raw_hash: row.get(12)?,
        revision: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

pub(crate) const POST_COLUMNS: &str = "id, usage_id, user_id, title, body, created_at, updated_at";

pub(crate) fn row_to_post(row: &Row<'_>) -> std::result::Result<Post, rusqlite::Error> {
    Ok(Post {
        id: row.get(0)?,
        usage_id: row.get(1)?,
        user_id: row.get(2)?,
        title: row.get(3)?,
        body: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
