//! Configuration loading and management.

use std::path::Path;

use chrono::{DateTime, Utc};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use punch_core::{ClockMark, Overrides, SessionConfig};
use serde::{Deserialize, Serialize};

/// Name of the per-repository config file.
pub const CONFIG_FILE: &str = "punch.toml";

/// A configured clock-in or clock-out entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockEntry {
    /// When the marker was recorded (RFC 3339).
    pub time: DateTime<Utc>,
    /// Author the marker belongs to, for author filtering.
    #[serde(default)]
    pub author: Option<String>,
}

/// Application configuration: session-builder tuning plus the manual
/// clock markers and diff filename filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Largest gap (minutes) between records in one block.
    pub time_cutoff: u32,
    /// Multiplier applied to estimated durations.
    pub estimation_factor: f64,
    /// Zero out the very first record instead of estimating it.
    pub ignore_initial: bool,
    /// Explicit durations by commit identifier prefix; order matters.
    pub overrides: Overrides,
    /// Manual clock-in markers.
    pub clock_in: Vec<ClockEntry>,
    /// Manual clock-out markers.
    pub clock_out: Vec<ClockEntry>,
    /// Only count diff lines in files matching this pattern.
    pub include_files: Option<String>,
    /// Never count diff lines in files matching this pattern.
    pub ignore_files: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_cutoff: 120,
            estimation_factor: 1.0,
            ignore_initial: false,
            overrides: Overrides::default(),
            clock_in: Vec::new(),
            clock_out: Vec::new(),
            include_files: None,
            ignore_files: None,
        }
    }
}

impl Config {
    /// Loads configuration: defaults, then `punch.toml` in the repo,
    /// then an explicit config file, then `PUNCH_*` environment
    /// variables, each layer overriding the previous one.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(repo: &Path, config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(repo.join(CONFIG_FILE)));

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("PUNCH_")).extract()
    }

    /// The session-builder slice of the configuration.
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            time_cutoff: self.time_cutoff,
            estimation_factor: self.estimation_factor,
            ignore_initial: self.ignore_initial,
            overrides: self.overrides.clone(),
        }
    }

    /// The clock entries as pipeline marks, ins and outs respectively.
    pub fn clock_marks(&self) -> (Vec<ClockMark>, Vec<ClockMark>) {
        let convert = |entries: &[ClockEntry]| {
            entries
                .iter()
                .map(|e| ClockMark {
                    timestamp: e.time,
                    author: e.author.clone(),
                })
                .collect()
        };
        (convert(&self.clock_in), convert(&self.clock_out))
    }
}
