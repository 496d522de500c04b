//! Background badge evaluation.
//!
//! The request path only enqueues a job; a single worker drains the queue and runs the
//! evaluation on the blocking pool. Failures are logged and never reach the submitter.

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::services::BadgeService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeJob {
    pub user_id: String,
}

#[derive(Clone, Debug)]
pub struct BadgeQueue {
    sender: mpsc::UnboundedSender<BadgeJob>,
}

impl BadgeQueue {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<BadgeJob>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn enqueue(&self, user_id: &str) {
        let job = BadgeJob {
            user_id: user_id.to_string(),
        };
        if let Err(err) = self.sender.send(job) {
            tracing::warn!(user = %err.0.user_id, "badge queue is closed; evaluation skipped");
        }
    }
}

pub async fn run_badge_worker(
    mut jobs: mpsc::UnboundedReceiver<BadgeJob>,
    badges: BadgeService,
) {
    while let Some(job) = jobs.recv().await {
        let service = badges.clone();
        let user_id = job.user_id.clone();
        let outcome =
            tokio::task::spawn_blocking(move || service.evaluate(&job.user_id, Utc::now())).await;
        match outcome {
            Ok(Ok(awarded)) if !awarded.is_empty() => {
                let names: Vec<&str> = awarded.iter().map(|badge| badge.as_str()).collect();
                tracing::info!(user = %user_id, badges = ?names, "badges awarded");
            }
            Ok(Ok(_)) => {}
            Ok(Err(err)) => {
                tracing::warn!(user = %user_id, error = %err, "badge evaluation failed")
            }
            Err(err) => tracing::warn!(user = %user_id, error = %err, "badge worker task failed"),
        }
    }
    tracing::debug!("badge queue closed");
}

/// Starts the worker on the current runtime and returns the queue that feeds it.
pub fn spawn_badge_worker(badges: BadgeService) -> (BadgeQueue, JoinHandle<()>) {
    let (queue, jobs) = BadgeQueue::channel();
    let handle = tokio::spawn(run_badge_worker(jobs, badges));
    (queue, handle)
}
