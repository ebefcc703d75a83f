use tabled::Table;

use crate::{cli::TempoOptions, error, types::BucketTableRow};

/// Prints the bucket layout for the given tempo options.
pub fn buckets(options: &TempoOptions) {
    let organizer = match options.organizer() {
        Ok(organizer) => organizer,
        Err(e) => error!("{}", e),
    };

    let rows: Vec<BucketTableRow> = organizer
        .playlists()
        .iter()
        .map(|p| BucketTableRow {
            low: p.low_tempo,
            high: p.high_tempo,
            name: p.name.clone(),
        })
        .collect();

    println!("{}", Table::new(rows));
}
