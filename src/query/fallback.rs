//! Candidate fallback over schema conventions
//!
//! The query layer does not know which convention a backend settled into, so
//! it tries [`FieldMapping::candidates`] in order. An empty result or a client
//! error moves on to the next candidate; a server or transport error aborts,
//! since later candidates would hit the same broken backend.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::mapping::{Document, FieldMapping, MetricQuery, MetricRow, SearchRequest};

/// Errors a search backend reports
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The request was rejected (4xx), usually a field the backend does not know
    #[error("client error {status}: {reason}")]
    Client {
        /// Status code
        status: u16,
        /// Backend-provided reason
        reason: String,
    },

    /// The backend failed (5xx)
    #[error("server error {status}: {reason}")]
    Server {
        /// Status code
        status: u16,
        /// Backend-provided reason
        reason: String,
    },

    /// The backend could not be reached
    #[error("transport error: {0}")]
    Transport(String),
}

impl SearchError {
    /// Classify an HTTP status code
    pub fn from_status(status: u16, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        if (400..500).contains(&status) {
            SearchError::Client { status, reason }
        } else {
            SearchError::Server { status, reason }
        }
    }

    /// Whether the next candidate should be tried
    pub fn falls_through(&self) -> bool {
        matches!(self, SearchError::Client { .. })
    }
}

/// Errors that end a fallback query
#[derive(Debug, Error)]
pub enum QueryError {
    /// A candidate hit a server or transport failure
    #[error("query aborted on candidate '{mapping}': {source}")]
    Aborted {
        /// Label of the candidate that failed
        mapping: String,
        /// Backend error
        #[source]
        source: SearchError,
    },

    /// No candidates were configured
    #[error("no field mapping candidates configured")]
    NoCandidates,
}

/// The search backend seam
pub trait MetricSearch {
    /// Run one search; hits are returned in backend order
    fn search(&self, request: &SearchRequest) -> Result<Vec<Document>, SearchError>;
}

impl<T: MetricSearch + ?Sized> MetricSearch for &T {
    fn search(&self, request: &SearchRequest) -> Result<Vec<Document>, SearchError> {
        (**self).search(request)
    }
}

/// What happened when one candidate was tried
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AttemptResult {
    /// No usable hits
    Empty,
    /// Rejected with a client error
    ClientError {
        /// Status code
        status: u16,
        /// Backend-provided reason
        reason: String,
    },
    /// Produced this many rows
    Rows {
        /// Row count
        count: usize,
    },
}

/// One candidate attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attempt {
    /// Candidate label
    pub mapping: String,
    /// Outcome
    #[serde(flatten)]
    pub result: AttemptResult,
}

/// Result of a fallback query
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryOutcome {
    /// Candidate that answered, `None` when every candidate came up empty
    pub mapping: Option<FieldMapping>,
    /// Rows from the answering candidate
    pub rows: Vec<MetricRow>,
    /// Every candidate tried, in order
    pub attempts: Vec<Attempt>,
}

impl QueryOutcome {
    /// True when no candidate produced rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Label of the answering candidate
    pub fn mapping_label(&self) -> Option<&str> {
        self.mapping.as_ref().map(|m| m.label.as_str())
    }
}

/// Tries field mappings in priority order until one yields rows
#[derive(Debug, Clone)]
pub struct FallbackQuery {
    candidates: Vec<FieldMapping>,
}

impl Default for FallbackQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackQuery {
    /// Use the fixed candidate list
    pub fn new() -> Self {
        Self { candidates: FieldMapping::candidates() }
    }

    /// Use a custom candidate list
    pub fn with_candidates(candidates: Vec<FieldMapping>) -> Self {
        Self { candidates }
    }

    /// Candidates in the order they are tried
    pub fn candidates(&self) -> &[FieldMapping] {
        &self.candidates
    }

    /// Run a query against a backend
    ///
    /// Hits that cannot be mapped back to a row are dropped; a candidate whose
    /// hits all drop counts as empty.
    #[instrument(skip(self, backend, query), fields(metric = %query.metric))]
    pub fn run<S: MetricSearch + ?Sized>(
        &self,
        backend: &S,
        query: &MetricQuery,
    ) -> Result<QueryOutcome, QueryError> {
        if self.candidates.is_empty() {
            return Err(QueryError::NoCandidates);
        }

        let mut outcome = QueryOutcome::default();

        for mapping in &self.candidates {
            let request = mapping.build_request(query);

            let hits = match backend.search(&request) {
                Ok(hits) => hits,
                Err(SearchError::Client { status, reason }) => {
                    debug!(mapping = %mapping, status, %reason, "Candidate rejected, falling back");
                    outcome.attempts.push(Attempt {
                        mapping: mapping.label.clone(),
                        result: AttemptResult::ClientError { status, reason },
                    });
                    continue;
                }
                Err(source) => {
                    warn!(mapping = %mapping, error = %source, "Query aborted");
                    return Err(QueryError::Aborted { mapping: mapping.label.clone(), source });
                }
            };

            let rows: Vec<MetricRow> =
                hits.iter().filter_map(|doc| mapping.extract_row(query.metric, doc)).collect();

            if rows.is_empty() {
                debug!(mapping = %mapping, hits = hits.len(), "Candidate returned no rows, falling back");
                outcome.attempts.push(Attempt { mapping: mapping.label.clone(), result: AttemptResult::Empty });
                continue;
            }

            debug!(mapping = %mapping, rows = rows.len(), "Candidate answered");
            outcome.attempts.push(Attempt {
                mapping: mapping.label.clone(),
                result: AttemptResult::Rows { count: rows.len() },
            });
            outcome.mapping = Some(mapping.clone());
            outcome.rows = rows;
            return Ok(outcome);
        }

        debug!(attempts = outcome.attempts.len(), "All candidates exhausted");
        Ok(outcome)
    }
}
