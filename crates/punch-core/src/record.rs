//! Records on the timeline: commits and manual clock markers.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Direction of a manual clock marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockDirection {
    In,
    Out,
}

/// A commit on the timeline, annotated with duration state as the
/// session builder resolves it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitRecord {
    /// When the commit was made.
    pub timestamp: DateTime<Utc>,
    /// Author email, used only for pipeline-level filtering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Commit identifier (content hash). None for records synthesized
    /// from a clock-in/clock-out pair.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Commit message, carried through for presentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Magnitude of the change, pre-computed by the diff collaborator.
    /// May be 0. None for synthesized records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_size: Option<u64>,
    /// Assigned duration in minutes. None until determined.
    pub minutes: Option<f64>,
    /// Time folded in from a clock-out that arrived before this record's
    /// own duration was known; applied when estimation occurs.
    #[serde(skip)]
    pub addition: f64,
    /// The duration was forced by a configured override.
    pub overridden: bool,
    /// The duration came from the statistical estimator.
    pub estimated: bool,
    /// The start of this record's span was anchored by a clock-in.
    pub clocked_in: bool,
    /// The end of this record's span was anchored by a clock-out.
    pub clocked_out: bool,
}

impl CommitRecord {
    /// Creates an unresolved record for a real commit.
    pub fn new(
        id: impl Into<String>,
        timestamp: DateTime<Utc>,
        author: Option<String>,
        message: impl Into<String>,
        diff_size: u64,
    ) -> Self {
        Self {
            timestamp,
            author,
            id: Some(id.into()),
            message: Some(message.into()),
            diff_size: Some(diff_size),
            minutes: None,
            addition: 0.0,
            overridden: false,
            estimated: false,
            clocked_in: false,
            clocked_out: false,
        }
    }

    /// Creates the stand-in record for a pure clock-in/clock-out pair.
    /// It has no commit behind it, so identifier, message, and diff size
    /// are all absent and the duration is known up front.
    pub const fn synthesized(timestamp: DateTime<Utc>, minutes: f64) -> Self {
        Self {
            timestamp,
            author: None,
            id: None,
            message: None,
            diff_size: None,
            minutes: Some(minutes),
            addition: 0.0,
            overridden: false,
            estimated: false,
            clocked_in: true,
            clocked_out: true,
        }
    }
}

/// A manual session boundary marker. Carries no duration of its own; it
/// only influences the durations of adjacent commit records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub direction: ClockDirection,
}

/// An event the session builder consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Record {
    Commit(CommitRecord),
    Clock(ClockRecord),
}

impl Record {
    /// When the record occurred.
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Commit(c) => c.timestamp,
            Self::Clock(c) => c.timestamp,
        }
    }

    /// Author identity, if the source supplied one.
    pub fn author(&self) -> Option<&str> {
        match self {
            Self::Commit(c) => c.author.as_deref(),
            Self::Clock(c) => c.author.as_deref(),
        }
    }
}

/// Signed span between two instants, in minutes.
pub(crate) fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let seconds = (to - from).num_seconds() as f64;
    seconds / 60.0
}

/// One continuous bout of work: a non-empty run of commit records in
/// ascending timestamp order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Block {
    records: Vec<CommitRecord>,
}

impl Block {
    pub(crate) fn new(first: CommitRecord) -> Self {
        Self {
            records: vec![first],
        }
    }

    pub(crate) fn push(&mut self, record: CommitRecord) {
        self.records.push(record);
    }

    /// The block's leading record.
    pub fn first(&self) -> &CommitRecord {
        &self.records[0]
    }

    pub(crate) fn first_mut(&mut self) -> &mut CommitRecord {
        &mut self.records[0]
    }

    /// The block's final record.
    pub fn last(&self) -> &CommitRecord {
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[CommitRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
