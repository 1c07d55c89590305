use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Raw catalog text as read from disk, one element per line. No invariants;
/// PDF extraction leaves arbitrary noise behind.
pub type RawDocument = Vec<String>;

/// Cleaned catalog text: one faculty record per line, no headers, no bare
/// page numbers. Produced by the normalizer.
pub type FlatFile = Vec<String>;

/// A faculty member's name split into its two catalog components.
///
/// Identity is positional within a flat file; two people can share a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultyName {
    pub first: String,
    pub last: String,
}

impl FacultyName {
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            last: last.into(),
        }
    }

    /// "First Last" display form
    pub fn display(&self) -> String {
        format!("{} {}", self.first, self.last)
    }

    /// "Last,First" as the catalogs print it; this is the form used for
    /// substring matching against another catalog's lines
    pub fn catalog_order(&self) -> String {
        format!("{},{}", self.last, self.first)
    }
}

/// Where an academic record was recovered from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    Catalog,
    Directory,
}

/// Result of resolving one faculty member's undergraduate record.
///
/// Missing, ambiguous and failed lookups are modeled outcomes, not errors;
/// none of them may abort processing of the rest of the batch.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// Raw degree/institution/year fragment
    Found { text: String, source: RecordSource },
    /// Nothing found anywhere for this person
    Missing,
    /// The directory returned several identifiers; the first listed was taken
    Ambiguous {
        text: Option<String>,
        chosen: String,
        discarded: Vec<String>,
    },
    /// Transport failure during lookup, downgraded to a missing record
    Failed { reason: String },
}

impl RecordOutcome {
    /// The education fragment, if one was recovered
    pub fn text(&self) -> Option<&str> {
        match self {
            RecordOutcome::Found { text, .. } => Some(text),
            RecordOutcome::Ambiguous { text, .. } => text.as_deref(),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, RecordOutcome::Missing)
    }
}

/// One assembled row of the faculty dataset. Missing fields stay missing;
/// they are never zeroed or dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacultyTableRow {
    pub name: String,
    pub graduation_year: Option<i32>,
    pub degree: Option<String>,
    pub age: Option<i32>,
    pub academic_year: String,
    pub department: Option<String>,
}

/// Seam between the lookup logic and the network, so disambiguation and
/// failure handling are testable without a live directory.
#[async_trait::async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Fetch the search-results page for a `first+last` query
    async fn search_page(&self, query: &str) -> Result<String>;

    /// Fetch the profile page for a unix identifier
    async fn profile_page(&self, unix_id: &str) -> Result<String>;
}
