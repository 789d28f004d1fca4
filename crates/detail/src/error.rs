// ABOUTME: Error types for SDAT scraping: ExtractError for document shape failures and ScrapeError for whole requests.
// ABOUTME: ScrapeError carries an ErrorCode category with convenience constructors and boolean helpers.

use std::fmt;

use thiserror::Error;

/// Failures raised while walking a parsed detail page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// No `<table>` with the requested id exists in the document.
    #[error("table with id {id:?} not found")]
    TableNotFound { id: String },

    /// The table has no header cell carrying the marker text.
    #[error("section {marker:?} not found")]
    SectionNotFound { marker: String },

    /// The marker was found but the rows after it do not have the expected shape.
    #[error("malformed {section:?} section: {reason}")]
    MalformedRow { section: String, reason: String },
}

impl ExtractError {
    pub fn table_not_found(id: impl Into<String>) -> Self {
        ExtractError::TableNotFound { id: id.into() }
    }

    pub fn section_not_found(marker: impl Into<String>) -> Self {
        ExtractError::SectionNotFound {
            marker: marker.into(),
        }
    }

    pub fn malformed(section: impl Into<String>, reason: impl Into<String>) -> Self {
        ExtractError::MalformedRow {
            section: section.into(),
            reason: reason.into(),
        }
    }

    /// The `ErrorCode` this failure maps to when surfaced through a `ScrapeError`.
    pub fn code(&self) -> ErrorCode {
        match self {
            ExtractError::TableNotFound { .. } | ExtractError::SectionNotFound { .. } => {
                ErrorCode::NotFound
            }
            ExtractError::MalformedRow { .. } => ErrorCode::Malformed,
        }
    }
}

/// Error codes representing different categories of scrape failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidQuery,
    Fetch,
    Timeout,
    NotFound,
    Malformed,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidQuery => "invalid query",
            ErrorCode::Fetch => "fetch error",
            ErrorCode::Timeout => "timeout",
            ErrorCode::NotFound => "structure not found",
            ErrorCode::Malformed => "malformed row",
        };
        write!(f, "{}", s)
    }
}

/// The error returned by every `Client` operation.
#[derive(Debug, Error)]
pub struct ScrapeError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ScrapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sdat: {} {}: {}", self.op, self.url, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ScrapeError {
    fn new(
        code: ErrorCode,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an InvalidQuery error.
    pub fn invalid_query(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::InvalidQuery, url, op, source)
    }

    /// Create a Fetch error.
    pub fn fetch(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Fetch, url, op, source)
    }

    /// Create a Timeout error.
    pub fn timeout(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Timeout, url, op, source)
    }

    /// Wrap a document failure, keeping its category.
    pub fn extract(url: impl Into<String>, op: impl Into<String>, err: ExtractError) -> Self {
        Self::new(err.code(), url, op, Some(anyhow::Error::new(err)))
    }

    /// The underlying `ExtractError`, when this error came from the document walk.
    pub fn extract_error(&self) -> Option<&ExtractError> {
        self.source
            .as_ref()
            .and_then(|src| src.downcast_ref::<ExtractError>())
    }

    /// Returns true if this is an InvalidQuery error.
    pub fn is_invalid_query(&self) -> bool {
        self.code == ErrorCode::InvalidQuery
    }

    /// Returns true if this is a Fetch error.
    pub fn is_fetch(&self) -> bool {
        self.code == ErrorCode::Fetch
    }

    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }

    /// Returns true if the table or a marker section was missing.
    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }

    /// Returns true if a section was found but its rows had the wrong shape.
    pub fn is_malformed(&self) -> bool {
        self.code == ErrorCode::Malformed
    }
}
