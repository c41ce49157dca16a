use std::future::Future;
use std::time::Duration;

use lcsync_core::{FetchError, LeetCodeClient, SubmissionDetail, SubmissionSummary, SummaryPage};
use thiserror::Error;

use super::submission::EnrichedSubmission;
use crate::events::{EventSink, SyncEvent};

pub const PAGE_SIZE: u32 = 20;

#[derive(Debug, Error)]
pub enum FetcherError {
    #[error(
        "LeetCode session expired or was rejected; refresh the LEETCODE_SESSION credential and run again ({0})"
    )]
    SessionExpired(#[source] FetchError),
    #[error("failed to fetch submissions at offset {offset}: {source}")]
    Remote {
        offset: u32,
        #[source]
        source: FetchError,
    },
}

/// The remote side of a sync. `LeetCodeClient` is the real one.
pub trait SubmissionSource: Send + Sync {
    fn fetch_summary_page(
        &self,
        offset: u32,
        limit: u32,
    ) -> impl Future<Output = Result<SummaryPage, FetchError>> + Send;

    fn fetch_detail(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<SubmissionDetail, FetchError>> + Send;
}

impl SubmissionSource for LeetCodeClient {
    fn fetch_summary_page(
        &self,
        offset: u32,
        limit: u32,
    ) -> impl Future<Output = Result<SummaryPage, FetchError>> + Send {
        LeetCodeClient::fetch_summary_page(self, offset, limit)
    }

    fn fetch_detail(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<SubmissionDetail, FetchError>> + Send {
        LeetCodeClient::fetch_detail(self, id)
    }
}

/// Courtesy delays between remote calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub detail_delay: Duration,
    pub page_delay: Duration,
}

impl Pacing {
    pub fn none() -> Self {
        Self {
            detail_delay: Duration::ZERO,
            page_delay: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            detail_delay: Duration::from_millis(500),
            page_delay: Duration::from_secs(2),
        }
    }
}

pub struct SubmissionFetcher<'a, S> {
    source: &'a S,
    pacing: Pacing,
    page_size: u32,
}

impl<'a, S: SubmissionSource> SubmissionFetcher<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            pacing: Pacing::default(),
            page_size: PAGE_SIZE,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Walks every page from offset 0 and returns the accepted submissions,
    /// enriched with their details, in the order the remote returned them.
    ///
    /// Stops on an empty page, on `hasNext == false`, or on a page shorter
    /// than requested, whichever comes first.
    pub async fn fetch_all_accepted(
        &self,
        sink: &dyn EventSink,
    ) -> Result<Vec<EnrichedSubmission>, FetcherError> {
        let mut offset = 0u32;
        let mut accepted = Vec::new();
        let mut details_fetched = 0usize;

        loop {
            sink.emit(
                SyncEvent::debug("fetching submission page")
                    .with("offset", offset)
                    .with("limit", self.page_size),
            );
            let page = match self.source.fetch_summary_page(offset, self.page_size).await {
                Ok(page) => page,
                Err(err) if err.is_authentication() => {
                    return Err(FetcherError::SessionExpired(err));
                }
                Err(source) => return Err(FetcherError::Remote { offset, source }),
            };

            if page.submissions.is_empty() {
                break;
            }
            let page_len = page.submissions.len();
            let has_next = page.has_next;
            let batch: Vec<SubmissionSummary> = page
                .submissions
                .into_iter()
                .filter(SubmissionSummary::is_accepted)
                .collect();
            sink.emit(
                SyncEvent::info("accepted submissions in page")
                    .with("offset", offset)
                    .with("accepted", batch.len())
                    .with("total", page_len),
            );

            for summary in batch {
                if details_fetched > 0 {
                    pause(self.pacing.detail_delay).await;
                }
                details_fetched += 1;
                accepted.push(self.enrich(summary, sink).await);
            }

            if !has_next || page_len < self.page_size as usize {
                break;
            }
            offset = offset.saturating_add(self.page_size);
            pause(self.pacing.page_delay).await;
        }

        sink.emit(
            SyncEvent::info("finished fetching accepted submissions").with("count", accepted.len()),
        );
        Ok(accepted)
    }

    async fn enrich(&self, summary: SubmissionSummary, sink: &dyn EventSink) -> EnrichedSubmission {
        if summary.id.is_empty() {
            sink.emit(
                SyncEvent::warn("accepted submission has no id; skipping detail fetch")
                    .with("slug", &summary.title_slug),
            );
            return EnrichedSubmission::from_summary(summary);
        }

        match self.source.fetch_detail(&summary.id).await {
            Ok(detail) => EnrichedSubmission::merge(summary, detail),
            Err(err) => {
                sink.emit(
                    SyncEvent::warn("failed to fetch submission details; keeping summary only")
                        .with("id", &summary.id)
                        .with("slug", &summary.title_slug)
                        .with("error", err),
                );
                EnrichedSubmission::from_summary(summary)
            }
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
