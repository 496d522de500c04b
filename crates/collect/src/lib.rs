mod client;
mod digest;
mod error;
mod merge;
mod range;
mod resolver;
mod sources;
mod sync;

pub use client::{LedgerClient, Submitter};
pub use digest::payload_digest;
pub use error::{CollectError, Result, SubmitError, SyncError};
pub use merge::{breakdown_for, merge_entries};
pub use range::{DateRange, resolve_range};
pub use resolver::{Invocation, ToolResolver, ToolSpec};
pub use sources::{
    DEFAULT_OUTPUT_LIMIT, DEFAULT_TIMEOUT, SourceAdapter, SourceOutput, SourceTool,
};
pub use sync::{CollectedUsage, PushOptions, PushReport, SyncClient, SyncState, format_count};
