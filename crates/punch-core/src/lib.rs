//! Core session-reconstruction logic for punch.
//!
//! This crate contains the fundamental types and logic for:
//! - Records: commit and clock events on a shared timeline
//! - Session building: merging records into blocks and assigning durations
//! - Estimation: pricing unknown durations from diff sizes
//! - Day totals: per-calendar-day accumulation

pub mod day;
pub mod estimate;
pub mod prepare;
pub mod record;
pub mod session;

pub use day::DayTotals;
pub use estimate::{EstimateTotals, OverrideRule, Overrides};
pub use prepare::{ClockMark, CommitInput, prepare_records, run_pipeline};
pub use record::{Block, ClockDirection, ClockRecord, CommitRecord, Record};
pub use session::{Session, SessionConfig, run};
