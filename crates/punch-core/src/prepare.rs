//! Pipeline entry: converts collaborator-supplied inputs into the sorted
//! record stream the session builder consumes.

use chrono::{DateTime, Utc};

use crate::record::{ClockDirection, ClockRecord, CommitRecord, Record};
use crate::session::{Session, SessionConfig};

/// A raw commit as supplied by the history collaborator, with the diff
/// size already computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInput {
    /// Stable unique identifier (content hash).
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub author: Option<String>,
    pub message: String,
    /// Non-negative magnitude of the change; weighting is the
    /// collaborator's concern.
    pub diff_size: u64,
}

/// A configured clock-in or clock-out marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockMark {
    pub timestamp: DateTime<Utc>,
    pub author: Option<String>,
}

/// Builds the session builder's input: records from commits and clock
/// marks, optionally filtered to one author, stably sorted by timestamp
/// so equal instants keep their insertion order.
pub fn prepare_records(
    commits: Vec<CommitInput>,
    clock_ins: Vec<ClockMark>,
    clock_outs: Vec<ClockMark>,
    author: Option<&str>,
) -> Vec<Record> {
    let mut records: Vec<Record> =
        Vec::with_capacity(commits.len() + clock_ins.len() + clock_outs.len());

    records.extend(commits.into_iter().map(|c| {
        Record::Commit(CommitRecord::new(
            c.id,
            c.timestamp,
            c.author,
            c.message,
            c.diff_size,
        ))
    }));
    records.extend(clock_ins.into_iter().map(|mark| {
        Record::Clock(ClockRecord {
            timestamp: mark.timestamp,
            author: mark.author,
            direction: ClockDirection::In,
        })
    }));
    records.extend(clock_outs.into_iter().map(|mark| {
        Record::Clock(ClockRecord {
            timestamp: mark.timestamp,
            author: mark.author,
            direction: ClockDirection::Out,
        })
    }));

    if let Some(author) = author {
        records.retain(|r| r.author() == Some(author));
    }

    records.sort_by_key(Record::timestamp);
    tracing::debug!(count = records.len(), "prepared record stream");
    records
}

/// Convenience glue: prepares the records and runs the session builder.
pub fn run_pipeline(
    commits: Vec<CommitInput>,
    clock_ins: Vec<ClockMark>,
    clock_outs: Vec<ClockMark>,
    author: Option<&str>,
    config: &SessionConfig,
) -> Session {
    let records = prepare_records(commits, clock_ins, clock_outs, author);
    crate::session::run(records, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 28, 8, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn input(id: &str, minute: i64, author: &str) -> CommitInput {
        CommitInput {
            id: id.into(),
            timestamp: at(minute),
            author: Some(author.into()),
            message: format!("commit {id}"),
            diff_size: 1,
        }
    }

    fn mark(minute: i64, author: &str) -> ClockMark {
        ClockMark {
            timestamp: at(minute),
            author: Some(author.into()),
        }
    }

    #[test]
    fn records_come_out_sorted_by_timestamp() {
        let records = prepare_records(
            vec![input("bbbb", 30, "a@x"), input("aaaa", 0, "a@x")],
            vec![mark(10, "a@x")],
            Vec::new(),
            None,
        );

        let times: Vec<_> = records.iter().map(Record::timestamp).collect();
        assert_eq!(times, vec![at(0), at(10), at(30)]);
    }

    #[test]
    fn equal_timestamps_keep_commits_before_clocks() {
        // The sort is stable and commits are inserted first.
        let records = prepare_records(
            vec![input("aaaa", 10, "a@x")],
            vec![mark(10, "a@x")],
            Vec::new(),
            None,
        );

        assert!(matches!(records[0], Record::Commit(_)));
        assert!(matches!(records[1], Record::Clock(_)));
    }

    #[test]
    fn author_filter_keeps_only_matching_records() {
        let records = prepare_records(
            vec![input("aaaa", 0, "a@x"), input("bbbb", 10, "b@x")],
            vec![mark(5, "a@x"), mark(6, "b@x")],
            Vec::new(),
            Some("a@x"),
        );

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.author() == Some("a@x")));
    }

    #[test]
    fn pipeline_resolves_every_commit() {
        let session = run_pipeline(
            vec![input("aaaa", 0, "a@x"), input("bbbb", 15, "a@x")],
            Vec::new(),
            Vec::new(),
            None,
            &SessionConfig::default(),
        );

        assert_eq!(session.blocks.len(), 1);
        assert!(
            session.blocks[0]
                .records()
                .iter()
                .all(|r| r.minutes.is_some())
        );
    }
}
