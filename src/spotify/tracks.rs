use reqwest::Url;

use crate::{
    Res, TempoError, debug, info,
    spotify::SpotifyClient,
    types::{AudioFeatures, AudioFeaturesResponse, PlaylistItem, PlaylistTrack},
};

/// Maximum number of ids per audio features request.
pub const AUDIO_FEATURES_BATCH_SIZE: usize = 100;

const PLAYLIST_ITEM_FIELDS: &str = "items(track(artists(name),name,id,type)),next";

impl SpotifyClient {
    /// Returns the tracks of a playlist.
    ///
    /// Only `artists`, `id`, `name` and `type` are requested. Episodes and
    /// entries without an id (local files) are dropped, since the API does
    /// not reliably honour `additional_types`.
    ///
    /// # Errors
    ///
    /// Fails if the playlist does not exist or any page cannot be fetched.
    pub async fn tracks_from_playlist(&mut self, playlist_id: &str) -> Res<Vec<PlaylistTrack>> {
        let url = Url::parse_with_params(
            &self.url(&format!("/playlists/{}/tracks", playlist_id)),
            &[
                ("fields", PLAYLIST_ITEM_FIELDS),
                ("additional_types", "track"),
                ("limit", "100"),
            ],
        )
        .map_err(|e| TempoError::InvalidConfig {
            name: crate::config::API_URL_VAR,
            reason: e.to_string(),
        })?;

        let items: Vec<PlaylistItem> = self.get_all_pages(url.to_string()).await?;

        let tracks: Vec<PlaylistTrack> = items
            .into_iter()
            .filter_map(|item| item.track)
            .filter(|track| track.kind == "track" && track.id.is_some())
            .collect();

        for track in &tracks {
            debug!(
                "{} - id: {}",
                track.name,
                track.id.as_deref().unwrap_or_default()
            );
        }

        Ok(tracks)
    }

    /// Fetches audio features in batches, dropping tracks Spotify has no
    /// analysis for.
    ///
    /// # Arguments
    ///
    /// * `track_ids` - Spotify track ids, requested
    ///   [`AUDIO_FEATURES_BATCH_SIZE`] at a time
    ///
    /// # Errors
    ///
    /// Fails if any batch is rejected.
    pub async fn audio_features(&mut self, track_ids: &[String]) -> Res<Vec<AudioFeatures>> {
        info!("Retrieving audio features of {} tracks...", track_ids.len());

        let mut features = Vec::with_capacity(track_ids.len());
        for chunk in track_ids.chunks(AUDIO_FEATURES_BATCH_SIZE) {
            let url = self.url(&format!("/audio-features?ids={}", chunk.join(",")));
            let response: AudioFeaturesResponse = self.get_json(&url).await?;
            features.extend(response.audio_features.into_iter().flatten());
        }

        Ok(features)
    }
}
