use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use url::Url;

use crate::retry::RetryPolicy;
use crate::submission::{SubmissionDetail, SummaryPage};

const DEFAULT_BASE_URL: &str = "https://leetcode.com";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

const SUBMISSION_LIST_QUERY: &str = "
query submissionList($offset: Int!, $limit: Int!) {
  submissionList(offset: $offset, limit: $limit) {
    lastKey
    hasNext
    submissions {
      id
      title
      titleSlug
      status
      statusDisplay
      lang
      timestamp
      isPending
    }
  }
}";

const SUBMISSION_DETAILS_QUERY: &str = "
query submissionDetails($submissionId: Int!) {
  submissionDetails(submissionId: $submissionId) {
    code
    timestamp
    statusCode
    lang {
      name
      verboseName
    }
    question {
      questionId
      titleSlug
      title
      difficulty
    }
  }
}";

// Lower-cased fragments of GraphQL error messages that mean the session
// cookie was rejected.
const AUTH_SIGNALS: &[&str] = &[
    "not logged in",
    "not authenticated",
    "unauthorized",
    "authentication",
    "session expired",
    "login required",
];

#[derive(Debug, Error)]
pub enum LeetCodeError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("api returned {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("graphql errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),
    #[error("response missing {0}")]
    MissingData(&'static str),
    #[error("invalid submission id: {0:?}")]
    InvalidSubmissionId(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorClass {
    Auth,
    Transient,
    Permanent,
}

/// Outcome of a call after the retry policy has been applied.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("remote unavailable after {attempts} attempt(s): {source}")]
    Transient {
        attempts: u32,
        #[source]
        source: LeetCodeError,
    },
    #[error("authentication rejected: {0}")]
    Authentication(#[source] LeetCodeError),
    #[error("request rejected: {0}")]
    Rejected(#[source] LeetCodeError),
}

impl FetchError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, FetchError::Authentication(_))
    }
}

#[derive(Clone)]
pub struct LeetCodeClient {
    http: Client,
    base_url: Url,
    session: String,
    retry: RetryPolicy,
}

impl LeetCodeClient {
    pub fn new(session: impl Into<String>) -> Result<Self, LeetCodeError> {
        Self::with_base_url(DEFAULT_BASE_URL, session)
    }

    pub fn with_base_url(base_url: &str, session: impl Into<String>) -> Result<Self, LeetCodeError> {
        Ok(Self {
            http: Client::new(),
            base_url: Url::parse(base_url)?,
            session: session.into(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn fetch_summary_page(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<SummaryPage, FetchError> {
        let client = self;
        self.retry
            .run(move || client.query_summary_page(offset, limit))
            .await
    }

    pub async fn fetch_detail(&self, id: &str) -> Result<SubmissionDetail, FetchError> {
        let submission_id = id
            .trim()
            .parse::<i64>()
            .map_err(|_| FetchError::Rejected(LeetCodeError::InvalidSubmissionId(id.to_string())))?;
        let client = self;
        self.retry
            .run(move || client.query_detail(submission_id))
            .await
    }

    async fn query_summary_page(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<SummaryPage, LeetCodeError> {
        let data: SubmissionListData = self
            .execute(
                SUBMISSION_LIST_QUERY,
                json!({ "offset": offset, "limit": limit }),
            )
            .await?;
        data.submission_list
            .ok_or(LeetCodeError::MissingData("submissionList"))
    }

    async fn query_detail(&self, submission_id: i64) -> Result<SubmissionDetail, LeetCodeError> {
        let data: SubmissionDetailsData = self
            .execute(
                SUBMISSION_DETAILS_QUERY,
                json!({ "submissionId": submission_id }),
            )
            .await?;
        data.submission_details
            .ok_or(LeetCodeError::MissingData("submissionDetails"))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, LeetCodeError> {
        let url = self.endpoint("/graphql")?;
        let response = self
            .http
            .post(url)
            .header("Cookie", self.cookie_header_value())
            .header("Referer", self.base_url.as_str())
            .header("User-Agent", USER_AGENT)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;
        let payload: GraphQlResponse<T> = Self::handle_response(response).await?;
        // Any error entry fails the call, even alongside partial data.
        if let Some(errors) = payload.errors {
            return Err(LeetCodeError::GraphQl(
                errors.into_iter().map(|e| e.message).collect(),
            ));
        }
        payload.data.ok_or(LeetCodeError::MissingData("data"))
    }

    fn cookie_header_value(&self) -> String {
        format!("LEETCODE_SESSION={}", self.session)
    }

    fn endpoint(&self, path: &str) -> Result<Url, LeetCodeError> {
        Ok(self.base_url.join(path)?)
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, LeetCodeError> {
        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(LeetCodeError::Api { status, body })
        }
    }
}

impl LeetCodeError {
    pub fn classification(&self) -> ApiErrorClass {
        match self {
            LeetCodeError::Request(_) | LeetCodeError::MissingData(_) => ApiErrorClass::Transient,
            LeetCodeError::Api { status, .. } => classify_api_status(*status),
            LeetCodeError::GraphQl(messages) => {
                if messages.iter().any(|message| is_auth_message(message)) {
                    ApiErrorClass::Auth
                } else {
                    ApiErrorClass::Transient
                }
            }
            LeetCodeError::Url(_) | LeetCodeError::InvalidSubmissionId(_) => {
                ApiErrorClass::Permanent
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.classification() == ApiErrorClass::Transient
    }
}

fn classify_api_status(status: StatusCode) -> ApiErrorClass {
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        ApiErrorClass::Auth
    } else if status.is_server_error()
        || matches!(
            status,
            StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS
        )
    {
        ApiErrorClass::Transient
    } else {
        ApiErrorClass::Permanent
    }
}

fn is_auth_message(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    AUTH_SIGNALS.iter().any(|signal| message.contains(signal))
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphQlErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionListData {
    #[serde(default)]
    submission_list: Option<SummaryPage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionDetailsData {
    #[serde(default)]
    submission_details: Option<SubmissionDetail>,
}
