use std::collections::HashSet;

use crate::{
    Res, debug, info,
    spotify::SpotifyClient,
    success,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest, Playlist,
    },
    utils,
};

/// Maximum number of items per add-items request.
pub const ADD_TRACKS_BATCH_SIZE: usize = 100;

impl SpotifyClient {
    /// Returns every playlist the current user follows.
    ///
    /// Follows pagination until the last page.
    ///
    /// # Arguments
    ///
    /// * `owned_only` - Drop playlists owned by other users
    /// * `excluded` - Ids or names of playlists to leave out
    ///
    /// # Errors
    ///
    /// Fails if any page cannot be fetched.
    pub async fn current_user_playlists(
        &mut self,
        owned_only: bool,
        excluded: &[String],
    ) -> Res<Vec<Playlist>> {
        let url = self.url("/me/playlists?limit=50");
        let mut playlists: Vec<Playlist> = self.get_all_pages(url).await?;

        if !excluded.is_empty() {
            playlists.retain(|p| !excluded.contains(&p.id) && !excluded.contains(&p.name));
        }

        if owned_only {
            let user_id = self.user_id().to_string();
            playlists.retain(|p| p.owner.id == user_id);
        }

        for playlist in &playlists {
            debug!(
                "Playlist {} (ID {}, {} tracks)",
                playlist.name, playlist.id, playlist.tracks.total
            );
        }

        Ok(playlists)
    }

    /// Creates a playlist for the current user.
    ///
    /// If the user already owns a playlist with exactly this name, that one is
    /// returned and nothing is created.
    ///
    /// # Arguments
    ///
    /// * `name` - Playlist name
    /// * `public` - Whether the playlist is listed on the user's profile
    /// * `description` - Playlist description
    ///
    /// # Errors
    ///
    /// Fails if the user's playlists cannot be listed or the create request
    /// is rejected.
    pub async fn create_playlist(
        &mut self,
        name: &str,
        public: bool,
        description: &str,
    ) -> Res<Playlist> {
        let existing = self.current_user_playlists(true, &[]).await?;
        if let Some(playlist) = existing.into_iter().find(|p| p.name == name) {
            info!("Playlist '{}' already exists.", name);
            return Ok(playlist);
        }

        let url = self.url(&format!("/users/{}/playlists", self.user_id()));
        let playlist: Playlist = self
            .post_json(
                &url,
                &CreatePlaylistRequest {
                    name: name.to_string(),
                    description: description.to_string(),
                    public,
                    collaborative: false,
                },
            )
            .await?;

        success!("Playlist '{}' (ID {}) is created.", name, playlist.id);
        Ok(playlist)
    }

    /// Unfollows a playlist. For an owned playlist this removes it from the
    /// user's library, which is as close to deleting it as the API gets.
    pub async fn unfollow_playlist(&mut self, playlist_id: &str) -> Res<()> {
        let url = self.url(&format!("/playlists/{}/followers", playlist_id));
        self.delete(&url).await
    }

    /// Unfollows every followed playlist without tracks and returns them.
    ///
    /// This includes playlists the user follows but does not own.
    ///
    /// # Errors
    ///
    /// Stops at the first playlist that cannot be listed or unfollowed.
    pub async fn unfollow_empty_playlists(&mut self) -> Res<Vec<Playlist>> {
        let empty: Vec<Playlist> = self
            .current_user_playlists(false, &[])
            .await?
            .into_iter()
            .filter(|p| p.tracks.total == 0)
            .collect();

        for playlist in &empty {
            info!("Unfollowing {} (ID {})", playlist.name, playlist.id);
            self.unfollow_playlist(&playlist.id).await?;
        }

        Ok(empty)
    }

    /// Adds tracks to a playlist, skipping ids that are already in it.
    ///
    /// Duplicate ids in `track_ids` are added once. URIs are posted in chunks
    /// of [`ADD_TRACKS_BATCH_SIZE`].
    ///
    /// # Arguments
    ///
    /// * `playlist_id` - Target playlist
    /// * `track_ids` - Spotify track ids (not URIs)
    ///
    /// # Returns
    ///
    /// The number of tracks added.
    ///
    /// # Errors
    ///
    /// Fails if the current items cannot be read or a chunk is rejected.
    /// Chunks posted before the failure stay in the playlist.
    pub async fn add_tracks_to_playlist(
        &mut self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Res<usize> {
        let present: HashSet<String> = self
            .tracks_from_playlist(playlist_id)
            .await?
            .into_iter()
            .filter_map(|t| t.id)
            .collect();

        let mut to_add: Vec<String> = track_ids
            .iter()
            .filter(|id| !present.contains(*id))
            .cloned()
            .collect();
        utils::remove_duplicate_ids(&mut to_add);

        if to_add.is_empty() {
            info!("All tracks are already in the playlist id: {}.", playlist_id);
            return Ok(0);
        }

        info!("Adding {} tracks to playlist id: {}", to_add.len(), playlist_id);
        let url = self.url(&format!("/playlists/{}/tracks", playlist_id));
        for chunk in to_add.chunks(ADD_TRACKS_BATCH_SIZE) {
            let request = AddTrackToPlaylistRequest {
                uris: chunk.iter().map(|id| utils::track_uri(id)).collect(),
            };
            let response: AddTrackToPlaylistResponse = self.post_json(&url, &request).await?;
            debug!("Playlist {} snapshot {}", playlist_id, response.snapshot_id);
        }

        Ok(to_add.len())
    }
}
