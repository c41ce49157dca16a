pub mod engine;
pub mod fetcher;
pub mod index;
pub mod language;
pub mod paths;
pub mod reconcile;
pub mod submission;
pub mod writer;

pub use engine::{FailedSubmission, SkippedSubmission, SyncEngine, SyncError, SyncReport};
pub use fetcher::{FetcherError, PAGE_SIZE, Pacing, SubmissionFetcher, SubmissionSource};
pub use index::{LocalIndex, build_index};
pub use reconcile::{
    Classified, ConflictPolicy, ConflictResolution, IgnorePolicy, OverwritePolicy, PromptPolicy,
    classify,
};
pub use submission::EnrichedSubmission;
pub use writer::{SkipReason, SolutionWriter, WriteError, WriteMode, WriteOutcome};
