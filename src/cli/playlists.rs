use tabled::Table;

use crate::{cli::auth::connect, config::Config, error, types::PlaylistTableRow, warning};

pub async fn list_playlists(config: &Config, owned_only: bool) {
    let mut client = match connect(config).await {
        Ok(client) => client,
        Err(e) => error!("Cannot connect to Spotify: {}", e),
    };

    let mut playlists = match client.current_user_playlists(owned_only, &[]).await {
        Ok(playlists) => playlists,
        Err(e) => error!("Failed to load playlists: {}", e),
    };

    if playlists.is_empty() {
        warning!("No playlists found.");
        return;
    }

    playlists.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    let rows: Vec<PlaylistTableRow> = playlists
        .into_iter()
        .map(|p| PlaylistTableRow {
            name: p.name,
            id: p.id,
            owner: p.owner.display_name.unwrap_or(p.owner.id),
            tracks: p.tracks.total,
        })
        .collect();

    println!("{}", Table::new(rows));
}
