use super::scoring::{self, ScoredTrack};
use super::shuffle::shuffled;
use crate::catalog::Track;
use rand::Rng;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Genre buckets, largest first (ties alphabetical)
pub fn group_by_genre(all_tracks: &[Track]) -> Vec<(&str, Vec<&Track>)> {
    let mut groups: BTreeMap<&str, Vec<&Track>> = BTreeMap::new();
    for track in all_tracks {
        groups.entry(track.genre_key()).or_default().push(track);
    }

    let mut groups: Vec<_> = groups.into_iter().collect();
    // Stable sort keeps the BTreeMap's alphabetical order within equal sizes
    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    groups
}

fn by_popularity<'a, I>(tracks: I) -> Vec<ScoredTrack<'a>>
where
    I: IntoIterator<Item = &'a Track>,
{
    let mut scored: Vec<ScoredTrack<'a>> = tracks
        .into_iter()
        .map(|track| ScoredTrack::new(track, scoring::raw_popularity(track)))
        .collect();
    scoring::rank(&mut scored);
    scored
}

/// Best performers from the biggest genres, topped up with overall hits,
/// then shuffled so the shelf doesn't read as a leaderboard.
pub fn featured<R: Rng + ?Sized>(
    all_tracks: &[Track],
    count: usize,
    tracks_per_genre: usize,
    rng: &mut R,
) -> Vec<Track> {
    if count == 0 || all_tracks.is_empty() {
        return Vec::new();
    }

    let groups = group_by_genre(all_tracks);
    let genres_needed = groups.len().min(count.div_ceil(2));

    let mut picked: Vec<&Track> = Vec::with_capacity(count.min(all_tracks.len()));
    let mut picked_ids: HashSet<&str> = HashSet::new();

    for (genre, tracks) in groups.iter().take(genres_needed) {
        let top = by_popularity(tracks.iter().copied());
        for scored in top.into_iter().take(tracks_per_genre) {
            picked_ids.insert(scored.track.id.as_str());
            picked.push(scored.track);
        }
        debug!("Featured genre '{}' ({} tracks)", genre, tracks.len());
    }

    if picked.len() < count {
        let backfill = by_popularity(
            all_tracks
                .iter()
                .filter(|track| !picked_ids.contains(track.id.as_str())),
        );
        let missing = count - picked.len();
        picked.extend(backfill.into_iter().take(missing).map(|scored| scored.track));
    }

    picked.truncate(count);
    shuffled(&picked, rng).into_iter().cloned().collect()
}
