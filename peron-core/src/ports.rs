//! Traits describing the schedule source and its failure modes.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;
use serde_json::Error as JsonError;

use crate::model::Timetable;

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while loading the schedule document. Any of these
/// is terminal for the session: the board degrades to a "no schedule
/// available" state and the user has to restart to retry.
pub enum SourceError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// The document is not valid JSON of the expected shape.
    #[error("Malformed schedule document: {0}")]
    Parse(#[from] JsonError),
    /// Local file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Internal source error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[async_trait]
/// Trait for schedule document backends. Loaded exactly once at startup;
/// the resulting [`Timetable`] is read-only for the process lifetime.
pub trait ScheduleSource: Send + Sync {
    /// Human-readable description of where the schedule comes from.
    fn location(&self) -> &str;

    /// Fetch, parse, and validate the timetable.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] when the document is unreachable or
    /// unparsable. Individual malformed entries are not errors; they are
    /// quarantined during validation.
    async fn load(&self) -> Result<Timetable, SourceError>;
}
