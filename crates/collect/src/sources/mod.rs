mod claude;
mod codex;

use std::process::Stdio;
use std::time::Duration;

use chrono::NaiveDate;
use ledger_core::{DailyUsageEntry, UsageValidationError, format_ledger_date, parse_ledger_date};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use crate::error::{CollectError, Result};
use crate::range::DateRange;
use crate::resolver::{Invocation, ToolResolver, ToolSpec};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_OUTPUT_LIMIT: usize = 64 * 1024 * 1024;

/// The closed set of reporters the client knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTool {
    /// Claude Code usage. Required: its failures abort the sync.
    ClaudeCode,
    /// Codex usage. Optional: its failures read as "no data".
    Codex,
}

impl SourceTool {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ClaudeCode => "ccusage",
            Self::Codex => "ccusage-codex",
        }
    }

    pub fn spec(&self) -> ToolSpec {
        match self {
            Self::ClaudeCode => ToolSpec {
                binary: "ccusage",
                package: "ccusage",
                version: "15.9.7",
            },
            Self::Codex => ToolSpec {
                binary: "ccusage-codex",
                package: "@ccusage/codex",
                version: "15.9.7",
            },
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Self::ClaudeCode)
    }

    /// Both reporters take compact `YYYYMMDD` bounds.
    pub fn format_date(&self, date: NaiveDate) -> String {
        date.format("%Y%m%d").to_string()
    }

    pub fn daily_args(&self, range: &DateRange) -> Vec<String> {
        vec![
            "daily".to_string(),
            "--json".to_string(),
            "--since".to_string(),
            self.format_date(range.since),
            "--until".to_string(),
            self.format_date(range.until),
        ]
    }

    pub fn parse(&self, raw: &str) -> Result<Vec<DailyUsageEntry>> {
        let entries = match self {
            Self::ClaudeCode => claude::parse_daily(self.name(), raw)?,
            Self::Codex => codex::parse_daily(self.name(), raw)?,
        };
        for entry in &entries {
            entry.validate().map_err(|source| CollectError::Invalid {
                tool: self.name(),
                source,
            })?;
        }
        Ok(entries)
    }
}

/// Raw stdout (kept for the digest) plus the parsed entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceOutput {
    pub raw: String,
    pub entries: Vec<DailyUsageEntry>,
}

pub struct SourceAdapter {
    tool: SourceTool,
    invocation: Invocation,
    timeout: Duration,
    output_limit: usize,
}

impl SourceAdapter {
    pub fn new(tool: SourceTool, invocation: Invocation) -> Self {
        Self {
            tool,
            invocation,
            timeout: DEFAULT_TIMEOUT,
            output_limit: DEFAULT_OUTPUT_LIMIT,
        }
    }

    pub fn resolve(tool: SourceTool, resolver: &ToolResolver) -> Self {
        Self::new(tool, resolver.resolve(&tool.spec()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_output_limit(mut self, limit: usize) -> Self {
        self.output_limit = limit;
        self
    }

    pub fn tool(&self) -> SourceTool {
        self.tool
    }

    pub async fn fetch(&self, range: &DateRange) -> Result<SourceOutput> {
        let raw = self.invoke(range).await?;
        let entries = self.tool.parse(&raw)?;
        Ok(SourceOutput { raw, entries })
    }

    /// Runs the tool and returns its stdout. The child is killed when the timeout fires.
    pub async fn invoke(&self, range: &DateRange) -> Result<String> {
        let tool = self.tool.name();
        let mut child = Command::new(&self.invocation.command)
            .args(&self.invocation.prefix_args)
            .args(self.tool.daily_args(range))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CollectError::Spawn {
                command: self.invocation.command.clone(),
                source,
            })?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let limit = self.output_limit;

        let run = async move {
            let (stdout, stderr, status) = tokio::try_join!(
                read_capped(tool, stdout, limit),
                read_capped(tool, stderr, limit),
                async {
                    child
                        .wait()
                        .await
                        .map_err(|source| CollectError::Io { tool, source })
                },
            )?;
            Ok::<_, CollectError>((stdout, stderr, status))
        };

        let (stdout, stderr, status) = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| CollectError::Timeout {
                tool,
                secs: self.timeout.as_secs(),
            })??;

        if !status.success() {
            return Err(CollectError::Exit {
                tool,
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&stdout).to_string())
    }
}

async fn read_capped<R>(tool: &'static str, reader: Option<R>, limit: usize) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let Some(reader) = reader else {
        return Ok(buf);
    };
    reader
        .take(limit as u64 + 1)
        .read_to_end(&mut buf)
        .await
        .map_err(|source| CollectError::Io { tool, source })?;
    if buf.len() > limit {
        return Err(CollectError::OutputTooLarge { tool, limit });
    }
    Ok(buf)
}

pub(crate) fn schema_error(tool: &'static str, message: impl Into<String>) -> CollectError {
    CollectError::Schema {
        tool,
        message: message.into(),
    }
}

pub(crate) fn require_date(tool: &'static str, date: Option<String>) -> Result<String> {
    match date {
        Some(date) if !date.trim().is_empty() => Ok(date.trim().to_string()),
        _ => Err(CollectError::Invalid {
            tool,
            source: UsageValidationError::MissingDate,
        }),
    }
}

/// Accepts `YYYY-MM-DD` and the long `Mon DD, YYYY` form some reporter versions print.
pub(crate) fn normalize_date(tool: &'static str, value: &str) -> Result<String> {
    if parse_ledger_date(value).is_some() {
        return Ok(value.to_string());
    }
    NaiveDate::parse_from_str(value, "%b %d, %Y")
        .map(format_ledger_date)
        .map_err(|_| schema_error(tool, format!("unrecognized date {value:?}")))
}

pub(crate) fn require_cost(tool: &'static str, date: &str, cost: Option<f64>) -> Result<f64> {
    cost.ok_or_else(|| schema_error(tool, format!("{date}: missing numeric cost")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_args_use_compact_dates() {
        let range = DateRange {
            since: NaiveDate::from_ymd_opt(2025, 6, 1).expect("date"),
            until: NaiveDate::from_ymd_opt(2025, 6, 7).expect("date"),
        };
        assert_eq!(
            SourceTool::Codex.daily_args(&range),
            vec!["daily", "--json", "--since", "20250601", "--until", "20250607"]
        );
    }

    #[test]
    fn parse_rejects_negative_tokens() {
        let raw = r#"[{"date":"2025-06-01","inputTokens":-1,"totalCost":1.0,"modelsUsed":[]}]"#;
        let err = SourceTool::ClaudeCode.parse(raw).expect_err("negative");
        assert!(err.to_string().contains("inputTokens must not be negative"));
    }

    #[test]
    fn only_claude_code_is_required() {
        assert!(SourceTool::ClaudeCode.is_required());
        assert!(!SourceTool::Codex.is_required());
    }
}
