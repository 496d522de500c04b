#![allow(dead_code)]

use chrono::{DateTime, Utc};
use ledger_app::{AppConfig, AppPaths, AppState, AuthMethod, Identity, ensure_app_data_dir};
use ledger_core::{BatchEntry, DailyUsageEntry, ModelCost, SubmissionBatch};
use tempfile::TempDir;

pub const SECRET: &str = "test-secret";

/// 2025-06-10 in UTC and at UTC+14.
pub fn now() -> DateTime<Utc> {
    at("2025-06-10T08:00:00Z")
}

pub fn at(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .expect("timestamp")
        .with_timezone(&Utc)
}

pub struct TestApp {
    pub _dir: TempDir,
    pub state: AppState,
}

pub fn setup_app() -> TestApp {
    let dir = tempfile::tempdir().expect("temp dir");
    let paths = AppPaths::new(dir.path().join("data"));
    ensure_app_data_dir(&paths).expect("data dir");
    let mut config = AppConfig::new(paths.db_path, SECRET);
    config.public_url = "https://ledger.test/".to_string();
    let state = AppState::new(config);
    state.setup_db().expect("setup db");
    TestApp { _dir: dir, state }
}

pub fn identity(user_id: &str) -> Identity {
    Identity {
        user_id: user_id.to_string(),
        username: None,
        method: AuthMethod::Bearer,
    }
}

pub fn entry(date: &str, model: &str, cost_usd: f64, total_tokens: i64) -> BatchEntry {
    BatchEntry {
        date: date.to_string(),
        data: DailyUsageEntry {
            date: date.to_string(),
            models: vec![model.to_string()],
            input_tokens: total_tokens / 2,
            output_tokens: total_tokens - total_tokens / 2,
            total_tokens,
            cost_usd,
            model_breakdown: Some(vec![ModelCost {
                model: model.to_string(),
                cost_usd,
            }]),
            ..Default::default()
        },
    }
}

pub fn batch(entries: Vec<BatchEntry>, source: &str) -> SubmissionBatch {
    SubmissionBatch {
        entries,
        hash: Some("digest-1".to_string()),
        source: source.to_string(),
    }
}
