use tabled::Table;

use crate::{
    Res,
    cli::{OrganizeOptions, auth::connect, spinner},
    config::Config,
    debug, error, info,
    spotify::SpotifyClient,
    success,
    tempo::{self, TempoOrganizer, TempoPlaylist},
    types::BucketSummaryRow,
    warning,
};

/// Counters of one organize run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizeReport {
    /// Owned playlists the tracks were read from.
    pub source_playlists: usize,
    /// Source playlists whose tracks or audio features could not be loaded.
    pub skipped_playlists: usize,
    /// Distinct tracks placed into a bucket.
    pub categorized: usize,
    /// Tracks whose tempo fits no bucket.
    pub skipped_tracks: usize,
    /// Tracks added to tempo playlists.
    pub added: usize,
    /// Empty playlists unfollowed at the end.
    pub unfollowed: usize,
}

/// Sorts the tracks of the user's own playlists into tempo playlists.
///
/// Connects to Spotify (authorizing first if needed), runs [`run_organize`]
/// and prints the result. Any error that stops the run exits the program.
pub async fn organize(config: &Config, options: &OrganizeOptions) {
    let mut organizer = match options.tempo.organizer() {
        Ok(organizer) => organizer,
        Err(e) => error!("{}", e),
    };

    let mut client = match connect(config).await {
        Ok(client) => client,
        Err(e) => error!("Cannot connect to Spotify: {}", e),
    };
    info!("Logged in as {}", client.user_id());

    let report = match run_organize(&mut client, &mut organizer, options).await {
        Ok(report) => report,
        Err(e) => error!("Failed to organize playlists: {}", e),
    };

    if !options.dry_run {
        success!(
            "Organized {} tracks into {} tempo playlists.",
            report.categorized,
            organizer.playlists().len()
        );
    }
}

/// Runs the organize workflow on an open session.
///
/// 1. Loads all owned playlists except generated tempo playlists, i.e. every
///    playlist named like a current bucket or starting with
///    [`tempo::PLAYLIST_NAME_PREFIX`]
/// 2. Reads their tracks and audio features and assigns each track a bucket
/// 3. Creates (or reuses) one playlist per bucket and adds the missing tracks
/// 4. Unfollows playlists left without tracks, unless `keep_empty` is set
///
/// With `dry_run` nothing is written to Spotify; the bucket summary is
/// printed either way.
///
/// # Arguments
///
/// * `client` - Authenticated session of the user whose playlists are sorted
/// * `organizer` - Bucket layout; collects the track ids
/// * `options` - Flags of the `organize` command
///
/// # Errors
///
/// Fails only when the user's playlists cannot be listed. A source playlist
/// that cannot be read, a track with an unusable tempo, and failures while
/// writing a single tempo playlist are logged as warnings and skipped.
pub async fn run_organize(
    client: &mut SpotifyClient,
    organizer: &mut TempoOrganizer,
    options: &OrganizeOptions,
) -> Res<OrganizeReport> {
    let mut report = OrganizeReport::default();

    let mut source_playlists = client
        .current_user_playlists(true, &organizer.playlist_names())
        .await?;
    // also skips tempo playlists generated with another layout
    source_playlists.retain(|p| !tempo::is_generated_playlist_name(&p.name));
    report.source_playlists = source_playlists.len();

    if source_playlists.is_empty() {
        warning!("No playlists of your own to organize.");
    }

    for playlist in &source_playlists {
        println!(
            "----------- Playlist: {} (ID: {}) -------------",
            playlist.name, playlist.id
        );

        let tracks = match client.tracks_from_playlist(&playlist.id).await {
            Ok(tracks) => tracks,
            Err(e) => {
                warning!("Skipping playlist {}: {}", playlist.name, e);
                report.skipped_playlists += 1;
                continue;
            }
        };

        let track_ids: Vec<String> = tracks.into_iter().filter_map(|t| t.id).collect();
        if track_ids.is_empty() {
            continue;
        }

        let pb = spinner("Fetching audio features...");
        let features = client.audio_features(&track_ids).await;
        pb.finish_and_clear();

        let features = match features {
            Ok(features) => features,
            Err(e) => {
                warning!("Skipping playlist {}: {}", playlist.name, e);
                report.skipped_playlists += 1;
                continue;
            }
        };

        if features.len() < track_ids.len() {
            warning!(
                "{} tracks in {} have no audio features.",
                track_ids.len() - features.len(),
                playlist.name
            );
        }

        for feature in features {
            match organizer.categorize_track(&feature.id, feature.tempo, feature.energy) {
                Ok(index) => debug!(
                    "{} (tempo {:.1}, energy {:.2}) -> {}",
                    feature.id,
                    feature.tempo,
                    feature.energy,
                    organizer.playlists()[index].name
                ),
                Err(e) => {
                    warning!("Skipping track {}: {}", feature.id, e);
                    report.skipped_tracks += 1;
                }
            }
        }
    }

    report.categorized = organizer.track_count();
    print_summary(organizer);

    if options.dry_run {
        info!("Dry run, no playlists were changed.");
        return Ok(report);
    }

    for tempo_playlist in organizer.playlists_mut() {
        let created = match client
            .create_playlist(
                &tempo_playlist.name,
                !options.private,
                &playlist_description(tempo_playlist),
            )
            .await
        {
            Ok(playlist) => playlist,
            Err(e) => {
                warning!("Failed to create playlist {}: {}", tempo_playlist.name, e);
                continue;
            }
        };
        tempo_playlist.id = Some(created.id.clone());

        if tempo_playlist.is_empty() {
            continue;
        }

        match client
            .add_tracks_to_playlist(&created.id, tempo_playlist.track_ids())
            .await
        {
            Ok(0) => {}
            Ok(added) => {
                success!("Added {} tracks to {}.", added, tempo_playlist.name);
                report.added += added;
            }
            Err(e) => warning!(
                "Failed to add tracks to playlist {}: {}",
                tempo_playlist.name,
                e
            ),
        }
    }

    if !options.keep_empty {
        match client.unfollow_empty_playlists().await {
            Ok(unfollowed) => {
                if !unfollowed.is_empty() {
                    success!("Unfollowed {} empty playlists.", unfollowed.len());
                }
                report.unfollowed = unfollowed.len();
            }
            Err(e) => warning!("Failed to unfollow empty playlists: {}", e),
        }
    }

    Ok(report)
}

pub fn playlist_description(playlist: &TempoPlaylist) -> String {
    format!(
        "Tracks between {} and {} BPM, sorted by tempo-organizer.",
        playlist.low_tempo, playlist.high_tempo
    )
}

fn print_summary(organizer: &TempoOrganizer) {
    let rows: Vec<BucketSummaryRow> = organizer
        .playlists()
        .iter()
        .map(|p| BucketSummaryRow {
            low: p.low_tempo,
            high: p.high_tempo,
            name: p.name.clone(),
            tracks: p.track_ids().len(),
        })
        .collect();

    println!("{}", Table::new(rows));
}
