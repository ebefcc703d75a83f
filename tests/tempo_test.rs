use tempo_organizer::{
    TempoError,
    tempo::{TempoOrganizer, TempoPlaylist, is_generated_playlist_name, playlist_name},
};

// Helper to read the bucket bounds of an organizer
fn bounds(organizer: &TempoOrganizer) -> Vec<(u32, u32)> {
    organizer
        .playlists()
        .iter()
        .map(|p| (p.low_tempo, p.high_tempo))
        .collect()
}

#[test]
fn test_playlist_default_name() {
    let playlist = TempoPlaylist::new(50, 64);
    assert_eq!(playlist.name, "auto-playlist-by-tempo [50, 64]");
    assert_eq!(playlist.id, None);
    assert!(playlist.is_empty());
}

#[test]
fn test_playlist_custom_name() {
    let playlist = TempoPlaylist::with_name(50, 64, "Slow".to_string());
    assert_eq!(playlist.name, "Slow");
}

#[test]
fn test_is_tempo_in_range_is_inclusive() {
    let playlist = TempoPlaylist::new(80, 94);
    assert!(!playlist.is_tempo_in_range(79));
    assert!(playlist.is_tempo_in_range(80));
    assert!(playlist.is_tempo_in_range(87));
    assert!(playlist.is_tempo_in_range(94));
    assert!(!playlist.is_tempo_in_range(95));
}

#[test]
fn test_add_track_ignores_duplicates() {
    let mut playlist = TempoPlaylist::new(80, 94);
    assert!(playlist.add_track("a"));
    assert!(playlist.add_track("b"));
    assert!(!playlist.add_track("a"));
    assert_eq!(playlist.track_ids(), &["a".to_string(), "b".to_string()]);
}

#[test]
fn test_default_layout() {
    let organizer = TempoOrganizer::new(50, 155, 15).unwrap();
    assert_eq!(
        bounds(&organizer),
        vec![
            (0, 49),
            (50, 64),
            (65, 79),
            (80, 94),
            (95, 109),
            (110, 124),
            (125, 139),
            (140, 154),
            (155, 299),
        ]
    );
    assert_eq!(organizer.energy_threshold, 0.6);
    assert_eq!(organizer.max_tempo, 300);
}

#[test]
fn test_layout_is_contiguous_when_range_is_not_a_multiple() {
    let organizer = TempoOrganizer::new(50, 150, 15).unwrap();
    let bounds = bounds(&organizer);

    // last stepped bucket is capped below the end tempo
    assert_eq!(bounds[bounds.len() - 2], (140, 149));
    assert_eq!(bounds[bounds.len() - 1], (150, 299));

    for pair in bounds.windows(2) {
        assert_eq!(pair[0].1 + 1, pair[1].0);
    }
}

#[test]
fn test_invalid_layouts_are_rejected() {
    assert!(matches!(
        TempoOrganizer::new(50, 155, 0),
        Err(TempoError::InvalidLayout(_))
    ));
    assert!(matches!(
        TempoOrganizer::new(0, 155, 15),
        Err(TempoError::InvalidLayout(_))
    ));
    assert!(matches!(
        TempoOrganizer::new(155, 50, 15),
        Err(TempoError::InvalidLayout(_))
    ));
    assert!(matches!(
        TempoOrganizer::new(50, 300, 15),
        Err(TempoError::InvalidLayout(_))
    ));
    assert!(matches!(
        TempoOrganizer::with_options(50, 155, 15, f64::NAN, 300),
        Err(TempoError::InvalidLayout(_))
    ));
}

#[test]
fn test_categorize_high_energy_keeps_tempo() {
    let mut organizer = TempoOrganizer::new(50, 155, 15).unwrap();
    let index = organizer.categorize_track("fast", 120.0, 0.9).unwrap();
    assert_eq!(organizer.playlists()[index].name, playlist_name(110, 124));
    assert_eq!(organizer.playlists()[index].track_ids(), &["fast".to_string()]);
}

#[test]
fn test_categorize_low_energy_halves_tempo() {
    let mut organizer = TempoOrganizer::new(50, 155, 15).unwrap();
    // 180 BPM at low energy counts as 90
    let index = organizer.categorize_track("slow", 180.0, 0.3).unwrap();
    assert_eq!(organizer.playlists()[index].low_tempo, 80);
    assert_eq!(organizer.playlists()[index].high_tempo, 94);
}

#[test]
fn test_energy_at_threshold_is_not_halved() {
    let organizer = TempoOrganizer::new(50, 155, 15).unwrap();
    assert_eq!(organizer.effective_tempo(130.0, 0.6).unwrap(), 130);
    assert_eq!(organizer.effective_tempo(130.0, 0.59).unwrap(), 65);
}

#[test]
fn test_fractional_tempo_is_rounded() {
    let mut organizer = TempoOrganizer::new(50, 155, 15).unwrap();
    // 159 / 2 = 79.5 rounds to 80, which must land in a bucket
    let index = organizer.categorize_track("edge", 159.0, 0.1).unwrap();
    assert_eq!(organizer.playlists()[index].low_tempo, 80);

    assert_eq!(organizer.effective_tempo(64.4, 1.0).unwrap(), 64);
    assert_eq!(organizer.effective_tempo(64.6, 1.0).unwrap(), 65);
}

#[test]
fn test_bottom_and_top_buckets() {
    let mut organizer = TempoOrganizer::new(50, 155, 15).unwrap();
    let low = organizer.categorize_track("low", 0.0, 1.0).unwrap();
    let high = organizer.categorize_track("high", 299.0, 1.0).unwrap();
    assert_eq!(low, 0);
    assert_eq!(high, organizer.playlists().len() - 1);
}

#[test]
fn test_tempo_above_maximum_is_an_error() {
    let mut organizer = TempoOrganizer::new(50, 155, 15).unwrap();
    let result = organizer.categorize_track("too-fast", 310.0, 0.9);
    assert!(matches!(
        result,
        Err(TempoError::TempoOutOfRange { max_tempo: 300, .. })
    ));
    // halving brings it back into range
    assert!(organizer.categorize_track("halved", 310.0, 0.1).is_ok());
    assert_eq!(organizer.track_count(), 1);
}

#[test]
fn test_invalid_tempo_values_are_errors() {
    let mut organizer = TempoOrganizer::new(50, 155, 15).unwrap();
    assert!(organizer.categorize_track("neg", -1.0, 0.9).is_err());
    assert!(organizer.categorize_track("nan", f64::NAN, 0.9).is_err());
    assert!(organizer.categorize_track("inf", f64::INFINITY, 0.9).is_err());
    assert_eq!(organizer.track_count(), 0);
}

#[test]
fn test_same_track_counted_once() {
    let mut organizer = TempoOrganizer::new(50, 155, 15).unwrap();
    organizer.categorize_track("a", 120.0, 0.9).unwrap();
    organizer.categorize_track("a", 120.0, 0.9).unwrap();
    organizer.categorize_track("b", 100.0, 0.9).unwrap();
    assert_eq!(organizer.track_count(), 2);
}

#[test]
fn test_playlist_names_match_buckets() {
    let organizer = TempoOrganizer::new(50, 155, 15).unwrap();
    let names = organizer.playlist_names();
    assert_eq!(names.len(), 9);
    assert_eq!(names[0], "auto-playlist-by-tempo [0, 49]");
    assert_eq!(names[8], "auto-playlist-by-tempo [155, 299]");
}

#[test]
fn test_playlists_mut_allows_setting_ids() {
    let mut organizer = TempoOrganizer::new(50, 155, 15).unwrap();
    for (i, playlist) in organizer.playlists_mut().iter_mut().enumerate() {
        playlist.id = Some(format!("id{}", i));
    }
    assert_eq!(organizer.playlists()[3].id.as_deref(), Some("id3"));
}

#[test]
fn test_generated_playlist_names_from_any_layout() {
    // names produced with another increment are still recognized
    assert!(is_generated_playlist_name("auto-playlist-by-tempo [60, 69]"));
    assert!(is_generated_playlist_name(&playlist_name(0, 49)));

    assert!(!is_generated_playlist_name("Rock"));
    assert!(!is_generated_playlist_name("auto-playlist-by-tempo-fans"));
    assert!(!is_generated_playlist_name("my auto-playlist-by-tempo [60, 69]"));
}
