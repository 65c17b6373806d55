use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use overlay_themer::UserId;

#[derive(Parser, Debug)]
#[command(
    name = "overlay-themer",
    version,
    about = "Switch accent, theme and clock overlays without conflicts"
)]
pub struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// User id to act for, or "current"
    #[arg(short, long, default_value = "current")]
    pub user: UserId,

    /// Print reports as JSON
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show theme, accent and clock state
    Status,
    /// List selectable accents
    Accents,
    /// Select an accent by number or name ("none" for stock)
    Accent { selection: String },
    /// Select the background theme
    Theme { theme: ThemeChoice },
    /// Select a clock style by number
    Clock { selection: i64 },
    /// Re-apply every stored setting
    Apply,
    /// Check for a third-party overlay engine (exit code 1 when found)
    Substratum,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeChoice {
    Light,
    Dark,
    Black,
}

impl ThemeChoice {
    /// `(dark, black)` bundle flags for this choice.
    pub const fn bundles(self) -> (bool, bool) {
        match self {
            Self::Light => (false, false),
            Self::Dark => (true, false),
            Self::Black => (false, true),
        }
    }
}
