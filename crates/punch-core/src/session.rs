//! The session builder: merges commit and clock records into contiguous
//! blocks of work and assigns a duration to every commit.
//!
//! # Algorithm summary
//!
//! 1. Sweep the sorted record list left to right with an explicit cursor,
//!    collapsing redundant clock markers, resolving clock-outs against
//!    their predecessor, and assigning durations that are computable from
//!    time gaps.
//! 2. Group resolved commits into blocks, splitting wherever the gap to
//!    the previous record's end exceeds the configured cutoff.
//! 3. Repair pass: estimate the duration of each block-leading commit
//!    that the sweep could not resolve, using the diff-to-minutes ratio
//!    observed across the rest of the run.
//!
//! Structural edits (deleting a clock marker, splicing in a synthesized
//! record) always re-enter the loop at the edited position, so every
//! record is resolved exactly once and the sweep stays O(n).

use serde::{Deserialize, Serialize};

use crate::day::DayTotals;
use crate::estimate::{EstimateTotals, Overrides};
use crate::record::{Block, ClockDirection, CommitRecord, Record, minutes_between};

/// Tuning knobs for the session builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Largest gap, in minutes, between a block's end and the next record
    /// that still extends the block.
    pub time_cutoff: u32,
    /// Multiplier applied to estimated durations.
    pub estimation_factor: f64,
    /// Assign zero minutes to the very first record of the timeline
    /// instead of estimating it (useful when the initial commit is
    /// boilerplate).
    pub ignore_initial: bool,
    /// Explicit durations for specific commits, by identifier prefix.
    pub overrides: Overrides,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_cutoff: 120,
            estimation_factor: 1.0,
            ignore_initial: false,
            overrides: Overrides::default(),
        }
    }
}

/// The reconstructed timeline: work blocks in order, plus per-day totals.
/// Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub blocks: Vec<Block>,
    pub day_totals: DayTotals,
}

/// Gap in minutes between a resolved record's end and a later timestamp.
/// A record's end is its timestamp plus its assigned minutes; unknown
/// minutes count as zero.
fn gap_after(prev: &CommitRecord, ts: chrono::DateTime<chrono::Utc>) -> f64 {
    minutes_between(prev.timestamp, ts) - prev.minutes.unwrap_or(0.0)
}

fn resolved_commit(records: &[Record], idx: usize) -> &CommitRecord {
    match &records[idx] {
        Record::Commit(c) => c,
        Record::Clock(_) => unreachable!("resolved index always points at a commit"),
    }
}

/// Runs the session builder over records sorted ascending by timestamp
/// (ties broken by input order).
///
/// Every commit record in the output carries an assigned duration, and
/// the day totals are fully populated. An empty input yields an empty
/// session.
#[allow(clippy::too_many_lines)]
pub fn run(records: Vec<Record>, config: &SessionConfig) -> Session {
    let cutoff = f64::from(config.time_cutoff);
    let mut records = records;
    let mut day_totals = DayTotals::default();
    let mut totals = EstimateTotals::default();
    // Indices (stable once resolved) where a new block begins.
    let mut starts: Vec<usize> = Vec::new();
    // Index of the most recently resolved commit; always the last record
    // of the block under construction.
    let mut last_resolved: Option<usize> = None;
    let mut i = 0;

    while i < records.len() {
        let Record::Clock(clock) = &records[i] else {
            resolve_commit(
                &mut records,
                i,
                last_resolved,
                cutoff,
                config,
                &mut starts,
                &mut day_totals,
                &mut totals,
            );
            last_resolved = Some(i);
            i += 1;
            continue;
        };
        let (direction, ts) = (clock.direction, clock.timestamp);

        // Repeated markers in one direction collapse to the later one;
        // only the state transition matters.
        if let Some(Record::Clock(next)) = records.get(i + 1) {
            if next.direction == direction {
                records.remove(i);
                continue;
            }
        }

        match direction {
            // A clock-in contributes nothing on its own; it anchors the
            // next commit when that commit is resolved.
            ClockDirection::In => i += 1,
            ClockDirection::Out => {
                if i == 0 {
                    tracing::debug!(%ts, "dropping clock-out with no predecessor");
                    records.remove(i);
                    continue;
                }

                // A pure in/out pair with no commit in between stands in
                // for a session of its own.
                let paired_in = match &records[i - 1] {
                    Record::Clock(c) if c.direction == ClockDirection::In => Some(c.timestamp),
                    _ => None,
                };
                if let Some(in_ts) = paired_in {
                    let span = minutes_between(in_ts, ts).max(0.0);
                    let rec = CommitRecord::synthesized(ts, span);
                    records.remove(i);
                    records.remove(i - 1);
                    let joined = last_resolved
                        .is_some_and(|j| gap_after(resolved_commit(&records, j), ts) <= cutoff);
                    if !joined {
                        starts.push(i - 1);
                    }
                    day_totals.add(span, ts);
                    // Nothing to feed the estimator: the record has no diff.
                    records.insert(i - 1, Record::Commit(rec));
                    last_resolved = Some(i - 1);
                    // The pair is consumed; the sweep resumes at whatever
                    // followed it, now sitting at the cursor.
                    continue;
                }

                // Otherwise the elapsed time since the preceding commit
                // folds into that commit, unless an override pinned it.
                if let Record::Commit(prev) = &mut records[i - 1] {
                    if prev.overridden {
                        tracing::debug!(
                            id = prev.id.as_deref(),
                            "clock-out after overridden commit ignored"
                        );
                    } else {
                        let elapsed = minutes_between(prev.timestamp, ts).max(0.0);
                        prev.clocked_out = true;
                        if let Some(known) = prev.minutes {
                            prev.minutes = Some(known + elapsed);
                            day_totals.add(elapsed, prev.timestamp);
                        } else {
                            // Unestimated block leader: carry the time
                            // forward until estimation applies it.
                            prev.addition += elapsed;
                        }
                    }
                }
                records.remove(i);
            }
        }
    }

    let mut blocks = collect_blocks(records, &starts);
    repair_pass(&mut blocks, &totals, config, &mut day_totals);

    Session { blocks, day_totals }
}

/// Resolves the commit at `i`: override lookup, clock-in anchoring, block
/// membership, and gap-derived duration. Leaves `minutes` unset for an
/// unanchored block leader so the repair pass can estimate it.
#[allow(clippy::too_many_arguments)]
fn resolve_commit(
    records: &mut [Record],
    i: usize,
    last_resolved: Option<usize>,
    cutoff: f64,
    config: &SessionConfig,
    starts: &mut Vec<usize>,
    day_totals: &mut DayTotals,
    totals: &mut EstimateTotals,
) {
    let ts = records[i].timestamp();
    let first_in_timeline = i == 0;
    let anchor = if i > 0 {
        match &records[i - 1] {
            Record::Clock(c) if c.direction == ClockDirection::In => Some(c.timestamp),
            _ => None,
        }
    } else {
        None
    };
    let gap = last_resolved.map(|j| gap_after(resolved_commit(records, j), ts));
    let joined = gap.is_some_and(|g| g <= cutoff);
    if !joined {
        starts.push(i);
    }

    let Record::Commit(commit) = &mut records[i] else {
        unreachable!("resolve_commit is only called on commit records");
    };

    if let Some(forced) = commit.id.as_deref().and_then(|id| config.overrides.lookup(id)) {
        commit.minutes = Some(forced);
        commit.overridden = true;
    }
    // The anchor flag is independent of any override.
    if anchor.is_some() {
        commit.clocked_in = true;
    }

    if !commit.overridden {
        if config.ignore_initial && first_in_timeline {
            commit.minutes = Some(0.0);
        } else if let Some(in_ts) = anchor {
            commit.minutes = Some(minutes_between(in_ts, ts).max(0.0));
        } else if joined {
            commit.minutes = Some(gap.unwrap_or(0.0).max(0.0));
        }
    }

    if let Some(minutes) = commit.minutes {
        day_totals.add(minutes, ts);
        if let Some(diff) = commit.diff_size {
            totals.record(minutes, diff);
        }
    }
}

/// Groups the swept records into blocks at the recorded start indices.
/// Leftover clock-ins carry no duration and are discarded here.
fn collect_blocks(records: Vec<Record>, starts: &[usize]) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::with_capacity(starts.len());
    let mut starts = starts.iter().copied().peekable();
    for (idx, record) in records.into_iter().enumerate() {
        let Record::Commit(commit) = record else {
            continue;
        };
        if starts.peek() == Some(&idx) {
            starts.next();
            blocks.push(Block::new(commit));
        } else if let Some(block) = blocks.last_mut() {
            block.push(commit);
        }
    }
    blocks
}

/// Estimates the duration of every block leader the sweep left unset,
/// and folds the results into the day totals.
fn repair_pass(
    blocks: &mut [Block],
    totals: &EstimateTotals,
    config: &SessionConfig,
    day_totals: &mut DayTotals,
) {
    for block in blocks {
        let first = block.first_mut();
        if first.minutes.is_some() {
            continue;
        }
        first.estimated = true;
        let estimate = totals.estimate(first.diff_size, config.estimation_factor, first.addition);
        first.minutes = Some(estimate);
        day_totals.add(estimate, first.timestamp);
        tracing::trace!(
            id = first.id.as_deref(),
            minutes = estimate,
            "estimated block leader"
        );
    }
}
