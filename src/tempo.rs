//! Tempo buckets and track categorization.
//!
//! A [`TempoOrganizer`] splits the range `[0, max_tempo)` into contiguous,
//! inclusive BPM buckets and keeps the ids of the tracks that fall into each
//! one. Every bucket later becomes a Spotify playlist.
//!
//! Spotify tends to report tempo in double time, so even slow songs end up
//! above 150 BPM. Tracks whose energy is below the threshold are therefore
//! counted at half their reported tempo. This is a heuristic, not a measurement.

use std::collections::HashSet;

use crate::{Res, TempoError};

pub const DEFAULT_START_TEMPO: u32 = 50;
pub const DEFAULT_END_TEMPO: u32 = 155;
pub const DEFAULT_INCREMENT: u32 = 15;
pub const DEFAULT_ENERGY_THRESHOLD: f64 = 0.6;
pub const DEFAULT_MAX_TEMPO: u32 = 300;

pub const PLAYLIST_NAME_PREFIX: &str = "auto-playlist-by-tempo";

/// One tempo range and the tracks collected for it.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoPlaylist {
    pub low_tempo: u32,
    pub high_tempo: u32,
    pub name: String,
    /// Spotify playlist id, known once the playlist exists remotely.
    pub id: Option<String>,
    track_ids: Vec<String>,
}

impl TempoPlaylist {
    pub fn new(low_tempo: u32, high_tempo: u32) -> Self {
        Self::with_name(low_tempo, high_tempo, playlist_name(low_tempo, high_tempo))
    }

    pub fn with_name(low_tempo: u32, high_tempo: u32, name: String) -> Self {
        Self {
            low_tempo,
            high_tempo,
            name,
            id: None,
            track_ids: Vec::new(),
        }
    }

    /// Both bounds are inclusive.
    pub fn is_tempo_in_range(&self, tempo: u32) -> bool {
        self.low_tempo <= tempo && tempo <= self.high_tempo
    }

    /// Adds a track id; returns `false` if it was already present.
    pub fn add_track(&mut self, track_id: &str) -> bool {
        if self.track_ids.iter().any(|id| id == track_id) {
            return false;
        }
        self.track_ids.push(track_id.to_string());
        true
    }

    /// Track ids in the order they were added.
    pub fn track_ids(&self) -> &[String] {
        &self.track_ids
    }

    pub fn is_empty(&self) -> bool {
        self.track_ids.is_empty()
    }
}

/// Default playlist name for a tempo range.
pub fn playlist_name(low_tempo: u32, high_tempo: u32) -> String {
    format!("{} [{}, {}]", PLAYLIST_NAME_PREFIX, low_tempo, high_tempo)
}

/// Whether a playlist name looks like one generated by [`playlist_name`],
/// whatever bucket layout it was generated with.
pub fn is_generated_playlist_name(name: &str) -> bool {
    name.strip_prefix(PLAYLIST_NAME_PREFIX)
        .is_some_and(|rest| rest.starts_with(" ["))
}

#[derive(Debug, Clone)]
pub struct TempoOrganizer {
    pub start_tempo: u32,
    pub end_tempo: u32,
    pub increment: u32,
    pub energy_threshold: f64,
    pub max_tempo: u32,
    playlists: Vec<TempoPlaylist>,
}

impl TempoOrganizer {
    /// Creates buckets with the default energy threshold and maximum tempo.
    pub fn new(start_tempo: u32, end_tempo: u32, increment: u32) -> Res<Self> {
        Self::with_options(
            start_tempo,
            end_tempo,
            increment,
            DEFAULT_ENERGY_THRESHOLD,
            DEFAULT_MAX_TEMPO,
        )
    }

    /// Creates the bucket layout:
    /// `[0, start-1]`, then `[t, t+increment-1]` for every `t` in
    /// `start..end` stepping by `increment`, then `[end, max_tempo-1]`.
    ///
    /// The last stepped bucket is capped at `end-1` so that buckets never
    /// overlap when `end - start` is not a multiple of `increment`.
    ///
    /// # Errors
    ///
    /// Returns [`TempoError::InvalidLayout`] if `increment` or `start_tempo`
    /// is zero, `start_tempo >= end_tempo`, `end_tempo >= max_tempo`, or the
    /// energy threshold is negative or not finite.
    pub fn with_options(
        start_tempo: u32,
        end_tempo: u32,
        increment: u32,
        energy_threshold: f64,
        max_tempo: u32,
    ) -> Res<Self> {
        if increment == 0 {
            return Err(TempoError::InvalidLayout(
                "increment must be greater than 0".to_string(),
            ));
        }
        if start_tempo == 0 {
            return Err(TempoError::InvalidLayout(
                "start tempo must be greater than 0".to_string(),
            ));
        }
        if start_tempo >= end_tempo {
            return Err(TempoError::InvalidLayout(format!(
                "start tempo {} must be lower than end tempo {}",
                start_tempo, end_tempo
            )));
        }
        if end_tempo >= max_tempo {
            return Err(TempoError::InvalidLayout(format!(
                "end tempo {} must be lower than maximum tempo {}",
                end_tempo, max_tempo
            )));
        }
        if !energy_threshold.is_finite() || energy_threshold < 0.0 {
            return Err(TempoError::InvalidLayout(format!(
                "energy threshold {} must be a non-negative number",
                energy_threshold
            )));
        }

        let mut playlists = vec![TempoPlaylist::new(0, start_tempo - 1)];
        let mut tempo = start_tempo;
        while tempo < end_tempo {
            let high = tempo.saturating_add(increment - 1).min(end_tempo - 1);
            playlists.push(TempoPlaylist::new(tempo, high));
            tempo = tempo.saturating_add(increment);
        }
        playlists.push(TempoPlaylist::new(end_tempo, max_tempo - 1));

        Ok(Self {
            start_tempo,
            end_tempo,
            increment,
            energy_threshold,
            max_tempo,
            playlists,
        })
    }

    /// Tempo used for bucketing, in whole BPM.
    ///
    /// Halves the reported tempo when `energy` is below the threshold, then
    /// rounds to the nearest integer.
    pub fn effective_tempo(&self, tempo: f64, energy: f64) -> Res<u32> {
        if !tempo.is_finite() || tempo < 0.0 {
            return Err(TempoError::TempoOutOfRange {
                tempo,
                max_tempo: self.max_tempo,
            });
        }

        let adjusted = if energy < self.energy_threshold {
            tempo / 2.0
        } else {
            tempo
        };

        let rounded = adjusted.round();
        if rounded >= self.max_tempo as f64 {
            return Err(TempoError::TempoOutOfRange {
                tempo: adjusted,
                max_tempo: self.max_tempo,
            });
        }

        Ok(rounded as u32)
    }

    /// Puts a track into the bucket matching its tempo and energy.
    ///
    /// Returns the index of that bucket in [`TempoOrganizer::playlists`].
    pub fn categorize_track(&mut self, track_id: &str, tempo: f64, energy: f64) -> Res<usize> {
        let bpm = self.effective_tempo(tempo, energy)?;

        let index = self
            .playlists
            .iter()
            .position(|p| p.is_tempo_in_range(bpm))
            .ok_or(TempoError::TempoOutOfRange {
                tempo: bpm as f64,
                max_tempo: self.max_tempo,
            })?;

        self.playlists[index].add_track(track_id);
        Ok(index)
    }

    pub fn playlists(&self) -> &[TempoPlaylist] {
        &self.playlists
    }

    pub fn playlists_mut(&mut self) -> &mut [TempoPlaylist] {
        &mut self.playlists
    }

    pub fn playlist_names(&self) -> Vec<String> {
        self.playlists.iter().map(|p| p.name.clone()).collect()
    }

    /// Number of distinct tracks placed in any bucket.
    pub fn track_count(&self) -> usize {
        self.playlists
            .iter()
            .flat_map(|p| p.track_ids())
            .collect::<HashSet<_>>()
            .len()
    }
}
