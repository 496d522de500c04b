#![allow(dead_code)]

use std::path::PathBuf;

use ledger_core::ModelCost;
use ledger_db::{Db, UsageRecordInput};
use tempfile::TempDir;

pub const NOW: &str = "2025-06-01T12:00:00Z";
pub const LATER: &str = "2025-06-01T18:30:00Z";

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub fn make_input(user_id: &str, date: &str, cost_usd: f64) -> UsageRecordInput {
    UsageRecordInput {
        user_id: user_id.to_string(),
        date: date.to_string(),
        cost_usd,
        input_tokens: 1000,
        output_tokens: 500,
        cache_creation_tokens: 0,
        cache_read_tokens: 0,
        total_tokens: 1500,
        models: vec!["claude-sonnet-4-20250514".to_string()],
        model_breakdown: vec![ModelCost {
            model: "claude-sonnet-4-20250514".to_string(),
            cost_usd,
        }],
        is_verified: true,
        raw_hash: Some("abc123".to_string()),
    }
}
