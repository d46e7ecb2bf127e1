//! Terminal rendering of the reconstructed session.
//!
//! The chart groups blocks under per-day headers with dotted fill and an
//! hour total, followed by a timeline row per block. Estimates list the
//! block-leading commits the estimator priced. All widths are computed
//! on the uncolored text; colors are applied last.

use std::fmt::Write;

use chrono::{Duration, NaiveDate};
use owo_colors::OwoColorize;
use punch_core::{Block, CommitRecord, Session};

/// Full chart width in columns.
const COLS: usize = 80;
/// Chart width when only day headers are shown.
const CONDENSED_COLS: usize = 30;
/// Day header format, e.g. "August 28, 2026".
const DAY_FORMAT: &str = "%B %e, %Y";

/// "X.XX hrs" for day and grand totals.
fn format_hours(minutes: f64) -> String {
    format!("{:.2} hrs", minutes / 60.0)
}

/// Compact duration for timeline cells: "42m" under an hour, "1.5h" from
/// there on.
fn format_minutes(minutes: f64) -> String {
    if minutes < 60.0 {
        format!("{minutes:.0}m")
    } else {
        format!("{:.1}h", minutes / 60.0)
    }
}

/// Long-form duration for the estimate listing.
fn format_minutes_long(minutes: f64) -> String {
    if minutes < 60.0 {
        format!("{minutes:.0} min")
    } else {
        format_hours(minutes)
    }
}

/// Truncates to `max` bytes on a char boundary, with a "..." tail.
fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max.saturating_sub(3);
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", text[..end].trim_end())
}

/// Renders the per-day chart. Condensed mode drops the timelines and
/// narrows the header fill.
pub fn render_chart(session: &Session, condensed: bool) -> String {
    let cols = if condensed { CONDENSED_COLS } else { COLS };
    let mut out = String::new();
    let mut current_day: Option<NaiveDate> = None;

    for block in &session.blocks {
        let day = block.first().timestamp.date_naive();
        if current_day != Some(day) {
            if !condensed && current_day.is_some() {
                out.push('\n');
            }
            current_day = Some(day);

            let label = day.format(DAY_FORMAT).to_string();
            let sum = format_hours(session.day_totals.get(day));
            let fill = ".".repeat(cols.saturating_sub(label.len() + sum.len()));
            writeln!(out, "{}{}{}", label.magenta(), fill.magenta(), sum.red()).unwrap();
        }

        if !condensed {
            render_timeline(&mut out, block);
        }
    }

    writeln!(
        out,
        "{}{}",
        " ".repeat(cols.saturating_sub(10)),
        "-".repeat(10).magenta()
    )
    .unwrap();
    let total = format_hours(session.day_totals.total());
    writeln!(
        out,
        "{}{}",
        " ".repeat(cols.saturating_sub(total.len())),
        total.red()
    )
    .unwrap();
    out
}

/// One wall-clock-labelled row of per-commit durations, wrapping with a
/// hanging indent. Clock-anchored ends are starred.
#[allow(clippy::cast_possible_truncation)]
fn render_timeline(out: &mut String, block: &Block) {
    // The block starts its leader's assigned minutes before the leader's
    // commit timestamp.
    let first = block.first();
    let start =
        first.timestamp - Duration::seconds((first.minutes.unwrap_or(0.0) * 60.0) as i64);
    let label = format!("{}:  ", start.format("%l:%M %p"));
    write!(out, "{}", label.yellow()).unwrap();

    let mut width = label.len();
    for record in block.records() {
        let mut cell = format_minutes(record.minutes.unwrap_or(0.0));
        if record.clocked_in {
            cell.insert(0, '*');
        }
        if record.clocked_out {
            cell.push('*');
        }

        let sep = " | ";
        if width + cell.len() + sep.len() > COLS - 5 {
            out.push('\n');
            width = label.len();
            out.push_str(&" ".repeat(width));
        }
        width += cell.len() + sep.len();

        // Blue separators flag synthesized records, which have no message.
        if record.message.is_some() {
            write!(out, "{cell}{}", sep.red()).unwrap();
        } else {
            write!(out, "{cell}{}", sep.bright_blue()).unwrap();
        }
    }
    out.push('\n');
}

/// Lists the block leaders whose durations came from the estimator.
pub fn render_estimates(session: &Session) -> String {
    let estimated: Vec<&CommitRecord> = session
        .blocks
        .iter()
        .map(Block::first)
        .filter(|r| r.estimated)
        .collect();

    if estimated.is_empty() {
        return "No estimations made.\n".to_string();
    }

    let mut out = String::new();
    let mut sum = 0.0;
    for record in estimated {
        let minutes = record.minutes.unwrap_or(0.0);
        let date = format!("{}:", record.timestamp.format("%b %e"));
        let sha = record
            .id
            .as_deref()
            .map_or("--------", |id| &id[..8.min(id.len())]);
        let time = format_minutes_long(minutes);

        let budget = COLS.saturating_sub(date.len() + sha.len() + time.len() + 6);
        let message = truncate(record.message.as_deref().unwrap_or(""), budget);
        let pad = COLS.saturating_sub(date.len() + sha.len() + message.len() + time.len() + 2);

        writeln!(
            out,
            "{} {} {message}{}{}",
            date.yellow(),
            sha.red(),
            " ".repeat(pad),
            time.bright_blue()
        )
        .unwrap();
        sum += minutes;
    }

    writeln!(
        out,
        "{}{}",
        " ".repeat(COLS.saturating_sub(10)),
        "-".repeat(10).bright_blue()
    )
    .unwrap();
    let total = format_hours(sum);
    writeln!(
        out,
        "{}{}",
        " ".repeat(COLS.saturating_sub(total.len())),
        total.bright_blue()
    )
    .unwrap();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use punch_core::{Record, SessionConfig, run};

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 28, 6, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn commit(id: &str, minute: i64, diff: u64) -> Record {
        Record::Commit(punch_core::CommitRecord::new(
            id,
            at(minute),
            Some("dev@example.com".into()),
            format!("commit {id}"),
            diff,
        ))
    }

    fn sample_session() -> Session {
        // Leader estimates to 30 (10 units at 3 min/unit), follower's gap
        // is 30; the day totals an hour.
        run(
            vec![commit("aaaa", 0, 10), commit("bbbb", 30, 10)],
            &SessionConfig::default(),
        )
    }

    #[test]
    fn chart_shows_day_header_and_total() {
        let out = render_chart(&sample_session(), false);
        assert!(out.contains("August 28, 2026"));
        assert!(out.contains("1.00 hrs"));
    }

    #[test]
    fn chart_timeline_labels_the_block_start() {
        // The leader's 30 estimated minutes precede its 06:00 timestamp.
        let out = render_chart(&sample_session(), false);
        assert!(out.contains("5:30 AM"));
        assert!(out.contains("30m"));
    }

    #[test]
    fn condensed_chart_drops_the_timelines() {
        let out = render_chart(&sample_session(), true);
        assert!(out.contains("August 28, 2026"));
        assert!(!out.contains("AM"));
    }

    #[test]
    fn chart_handles_an_empty_session() {
        let session = run(Vec::new(), &SessionConfig::default());
        let out = render_chart(&session, false);
        assert!(out.contains("0.00 hrs"));
    }

    #[test]
    fn estimates_list_estimated_leaders_only() {
        let out = render_estimates(&sample_session());
        assert!(out.contains("Aug 28"));
        assert!(out.contains("aaaa"));
        assert!(out.contains("30 min"));
        assert!(!out.contains("bbbb"));
    }

    #[test]
    fn estimates_report_when_nothing_was_estimated() {
        // A pure clock pair synthesizes a known duration; nothing is
        // estimated.
        let session = run(
            vec![
                Record::Clock(punch_core::ClockRecord {
                    timestamp: at(0),
                    author: None,
                    direction: punch_core::ClockDirection::In,
                }),
                Record::Clock(punch_core::ClockRecord {
                    timestamp: at(30),
                    author: None,
                    direction: punch_core::ClockDirection::Out,
                }),
            ],
            &SessionConfig::default(),
        );
        let out = render_estimates(&session);
        assert_eq!(out, "No estimations made.\n");
    }

    #[test]
    fn duration_formats() {
        assert_eq!(format_minutes(45.0), "45m");
        assert_eq!(format_minutes(90.0), "1.5h");
        assert_eq!(format_minutes_long(45.0), "45 min");
        assert_eq!(format_minutes_long(90.0), "1.50 hrs");
        assert_eq!(format_hours(60.0), "1.00 hrs");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        let cut = truncate("a long message that will not fit", 12);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= 12);
        // Multi-byte content must not split a character.
        let emoji = truncate(&"é".repeat(40), 11);
        assert!(emoji.ends_with("..."));
    }
}
