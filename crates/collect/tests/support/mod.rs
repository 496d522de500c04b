#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use collect::{Invocation, SourceAdapter, SourceTool, SubmitError, Submitter};
use ledger_core::{IngestAction, SubmissionBatch, SubmitResponse, SubmitResult};

/// Writes a shell script that ignores its arguments and runs `body`.
pub fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    path
}

/// A reporter that prints `payload` verbatim.
pub fn printing_adapter(dir: &Path, tool: SourceTool, payload: &str) -> SourceAdapter {
    let payload_path = dir.join(format!("{}.json", tool.name()));
    fs::write(&payload_path, payload).expect("write payload");
    let script = script(
        dir,
        &format!("{}.sh", tool.name()),
        &format!("cat '{}'", payload_path.display()),
    );
    script_adapter(tool, &script)
}

pub fn script_adapter(tool: SourceTool, script: &Path) -> SourceAdapter {
    SourceAdapter::new(
        tool,
        Invocation {
            command: "sh".to_string(),
            prefix_args: vec![script.to_string_lossy().to_string()],
        },
    )
}

#[derive(Default)]
pub struct RecordingSubmitter {
    pub batches: Mutex<Vec<SubmissionBatch>>,
    pub reject_with: Option<(u16, String)>,
}

impl RecordingSubmitter {
    pub fn calls(&self) -> usize {
        self.batches.lock().expect("lock").len()
    }
}

#[async_trait]
impl Submitter for RecordingSubmitter {
    async fn submit(&self, batch: &SubmissionBatch) -> Result<SubmitResponse, SubmitError> {
        self.batches.lock().expect("lock").push(batch.clone());
        if let Some((status, message)) = &self.reject_with {
            return Err(SubmitError::Rejected {
                status: *status,
                message: message.clone(),
            });
        }
        let results = batch
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| SubmitResult {
                date: entry.date.clone(),
                usage_id: index as i64 + 1,
                post_id: index as i64 + 1,
                post_url: format!("https://ledger.test/posts/{}", index + 1),
                action: IngestAction::Created,
            })
            .collect();
        Ok(SubmitResponse { results })
    }
}
