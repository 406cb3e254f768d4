use crate::catalog::Track;
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;

type Dated<'a> = (&'a Track, Option<DateTime<Utc>>);

/// Newest first; undated tracks sink to the bottom, ties by id
fn newest_first(a: &Dated<'_>, b: &Dated<'_>) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.id.cmp(&b.0.id))
}

/// Tracks released inside the window, newest first, topped up with older
/// releases (also newest first) when the window runs dry.
pub fn new_releases(
    all_tracks: &[Track],
    count: usize,
    window_days: f64,
    now: DateTime<Utc>,
) -> Vec<Track> {
    if count == 0 {
        return Vec::new();
    }

    // A window reaching past the earliest representable instant covers every dated track
    let window_ms = (window_days * 86_400_000.0) as i64;
    let cutoff = Duration::try_milliseconds(window_ms).and_then(|w| now.checked_sub_signed(w));

    // Scheduled releases (dated after now) count as recent
    let (mut recent, mut older): (Vec<Dated<'_>>, Vec<Dated<'_>>) = all_tracks
        .iter()
        .map(|track| (track, track.released_at()))
        .partition(|(_, released)| match (released, cutoff) {
            (Some(at), Some(cutoff)) => *at >= cutoff,
            (Some(_), None) => true,
            (None, _) => false,
        });

    recent.sort_by(newest_first);
    if recent.len() < count {
        older.sort_by(newest_first);
        recent.extend(older);
    }

    recent
        .into_iter()
        .take(count)
        .map(|(track, _)| track.clone())
        .collect()
}
