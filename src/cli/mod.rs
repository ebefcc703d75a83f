//! # CLI Module
//!
//! User-facing commands. Each command resolves what it needs (configuration,
//! a token, an API session), reports progress through the crate's output
//! macros, and turns unrecoverable errors into an `error!` exit.
//!
//! ## Commands
//!
//! - [`organize`] - Sorts the tracks of the user's own playlists into tempo
//!   playlists (the default command)
//! - [`auth`] - Runs the OAuth flow and caches the token
//! - [`list_playlists`] - Shows the user's playlists as a table
//! - [`buckets`] - Shows the tempo bucket layout without touching Spotify
//!
//! ## Usage
//!
//! ```bash
//! tempo-organizer                         # organize with default buckets
//! tempo-organizer organize --dry-run      # only print the bucket summary
//! tempo-organizer buckets --increment 10  # preview a different layout
//! tempo-organizer playlists --owned
//! ```

mod auth;
mod buckets;
mod organize;
mod playlists;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    Res,
    tempo::{self, TempoOrganizer},
};

pub use auth::{auth, authorize_and_persist, connect};
pub use buckets::buckets;
pub use organize::{OrganizeReport, organize, playlist_description, run_organize};
pub use playlists::list_playlists;

/// Parameters of the tempo bucket layout.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoOptions {
    pub start_tempo: u32,
    pub end_tempo: u32,
    pub increment: u32,
    pub energy_threshold: f64,
}

impl Default for TempoOptions {
    fn default() -> Self {
        Self {
            start_tempo: tempo::DEFAULT_START_TEMPO,
            end_tempo: tempo::DEFAULT_END_TEMPO,
            increment: tempo::DEFAULT_INCREMENT,
            energy_threshold: tempo::DEFAULT_ENERGY_THRESHOLD,
        }
    }
}

impl TempoOptions {
    pub fn organizer(&self) -> Res<TempoOrganizer> {
        TempoOrganizer::with_options(
            self.start_tempo,
            self.end_tempo,
            self.increment,
            self.energy_threshold,
            tempo::DEFAULT_MAX_TEMPO,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganizeOptions {
    pub tempo: TempoOptions,
    /// Only print what would be done.
    pub dry_run: bool,
    /// Skip unfollowing empty playlists at the end.
    pub keep_empty: bool,
    /// Create the tempo playlists as private.
    pub private: bool,
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
