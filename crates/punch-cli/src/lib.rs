pub mod cli;
pub mod config;
pub mod render;

pub use cli::{Cli, Commands};
pub use config::{CONFIG_FILE, Config};
pub use render::{render_chart, render_estimates};
