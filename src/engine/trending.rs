use super::scoring::{self, ScoredTrack};
use crate::catalog::Track;
use crate::config::EngineConfig;
use chrono::{DateTime, Utc};

/// Raw popularity damped by age. Past the window the damping stops at the floor,
/// so an old hit still trends at half strength.
pub fn trending_score(track: &Track, config: &EngineConfig, now: DateTime<Utc>) -> f64 {
    let recency = scoring::trending_recency(
        scoring::age_in_days(track, now),
        config.trending_window_days,
        config.trending_recency_floor,
    );
    scoring::raw_popularity(track) * recency
}

pub fn trending(
    all_tracks: &[Track],
    count: usize,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Vec<Track> {
    if count == 0 {
        return Vec::new();
    }

    let mut scored: Vec<ScoredTrack<'_>> = all_tracks
        .iter()
        .map(|track| ScoredTrack::new(track, trending_score(track, config, now)))
        .collect();
    scoring::rank(&mut scored);

    scored
        .into_iter()
        .take(count)
        .map(|scored| scored.track.clone())
        .collect()
}
