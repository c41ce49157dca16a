mod client;
mod retry;
mod submission;

pub use client::{ApiErrorClass, FetchError, LeetCodeClient, LeetCodeError};
pub use retry::RetryPolicy;
pub use submission::{
    ACCEPTED_STATUS, Difficulty, LanguageInfo, QuestionInfo, SubmissionDetail, SubmissionSummary,
    SummaryPage,
};
