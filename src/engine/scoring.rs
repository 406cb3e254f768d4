use crate::behavior::ListeningProfile;
use crate::catalog::Track;
use crate::config::ScoringWeights;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

// Normalized popularity caps - past these a track is as popular as it gets
const PLAYS_CAP: f64 = 1_000_000.0;
const LIKES_CAP: f64 = 100_000.0;
const PLAYS_SHARE: f64 = 0.7;
const LIKES_SHARE: f64 = 0.3;

// Raw popularity scale used by trending and featured
const PLAYS_PER_POINT: f64 = 10_000.0;
const LIKES_PER_POINT: f64 = 1_000.0;

/// A track paired with its score for one ranking pass. Never escapes the engine.
#[derive(Debug, Clone, Copy)]
pub struct ScoredTrack<'a> {
    pub track: &'a Track,
    pub score: f64,
}

impl<'a> ScoredTrack<'a> {
    pub fn new(track: &'a Track, score: f64) -> Self {
        Self { track, score }
    }
}

/// Highest score first, ties by id so rankings are reproducible
pub fn by_score_desc(a: &ScoredTrack<'_>, b: &ScoredTrack<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.track.id.cmp(&b.track.id))
}

pub fn rank(scored: &mut [ScoredTrack<'_>]) {
    scored.sort_by(by_score_desc);
}

/// Days since release, never negative. Unparseable dates are infinitely old.
pub fn age_in_days(track: &Track, now: DateTime<Utc>) -> f64 {
    match track.released_at() {
        Some(released) => {
            let millis = (now - released).num_milliseconds() as f64;
            (millis / MILLIS_PER_DAY).max(0.0)
        }
        None => f64::INFINITY,
    }
}

/// Linear decay to zero over `horizon_days`
pub fn recency_score(age_days: f64, horizon_days: f64) -> f64 {
    (1.0 - age_days / horizon_days).max(0.0)
}

/// Linear decay over `window_days` that bottoms out at `floor` instead of zero
pub fn trending_recency(age_days: f64, window_days: f64, floor: f64) -> f64 {
    (1.0 - age_days / window_days).max(floor)
}

/// Plays and likes squashed into [0, 1], plays weighted heavier
pub fn normalized_popularity(track: &Track) -> f64 {
    let plays = (track.play_total() / PLAYS_CAP).min(1.0);
    let likes = (track.like_total() / LIKES_CAP).min(1.0);
    PLAYS_SHARE * plays + LIKES_SHARE * likes
}

/// Unbounded popularity for trending/featured ordering
pub fn raw_popularity(track: &Track) -> f64 {
    track.play_total() / PLAYS_PER_POINT + track.like_total() / LIKES_PER_POINT
}

/// Discovery bonus for tracks the user has never played
pub fn freshness(track_id: &str, profile: &ListeningProfile) -> f64 {
    if profile.has_played(track_id) {
        0.0
    } else {
        1.0
    }
}

/// Personalized relevance: weighted blend of recency, popularity, preference
/// and freshness. Stays in [0, 1] as long as the weights sum to 1.
pub fn personalized_score(
    track: &Track,
    profile: &ListeningProfile,
    weights: &ScoringWeights,
    recency_horizon_days: f64,
    now: DateTime<Utc>,
) -> f64 {
    let recency = recency_score(age_in_days(track, now), recency_horizon_days);
    let popularity = normalized_popularity(track);
    let preference = profile.preference(&track.id);
    let fresh = freshness(&track.id, profile);

    weights.recency * recency
        + weights.popularity * popularity
        + weights.user_preference * preference
        + weights.freshness * fresh
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn released_days_ago(days: i64) -> Track {
        let date = (now() - Duration::days(days)).to_rfc3339();
        Track::new("t1", "a1").with_release_date(date)
    }

    #[test]
    fn test_age_in_days() {
        assert!((age_in_days(&released_days_ago(10), now()) - 10.0).abs() < 1e-9);
        // Scheduled releases clamp to zero
        assert_eq!(age_in_days(&released_days_ago(-3), now()), 0.0);
        assert!(age_in_days(&Track::new("t1", "a1"), now()).is_infinite());
    }

    #[test]
    fn test_recency_decay() {
        assert_eq!(recency_score(0.0, 365.0), 1.0);
        assert!((recency_score(182.5, 365.0) - 0.5).abs() < 1e-9);
        assert_eq!(recency_score(400.0, 365.0), 0.0);
        assert_eq!(recency_score(f64::INFINITY, 365.0), 0.0);

        assert_eq!(trending_recency(0.0, 30.0, 0.5), 1.0);
        assert_eq!(trending_recency(90.0, 30.0, 0.5), 0.5);
        assert_eq!(trending_recency(f64::INFINITY, 30.0, 0.5), 0.5);
    }

    #[test]
    fn test_popularity_scales() {
        let viral = Track::new("t1", "a1").with_counts(50_000_000, 9_000_000);
        assert!((normalized_popularity(&viral) - 1.0).abs() < 1e-9);

        let modest = Track::new("t2", "a1").with_counts(500_000, 0);
        assert!((normalized_popularity(&modest) - 0.35).abs() < 1e-9);

        let track = Track::new("t3", "a1").with_counts(20_000, 3_000);
        assert!((raw_popularity(&track) - 5.0).abs() < 1e-9);

        let broken = Track::new("t4", "a1").with_counts(-5, -5);
        assert_eq!(normalized_popularity(&broken), 0.0);
        assert_eq!(raw_popularity(&broken), 0.0);
    }

    #[test]
    fn test_personalized_score_components() {
        let weights = ScoringWeights::default();
        let track = released_days_ago(0).with_counts(1_000_000, 100_000);

        // Unplayed: recency + popularity + freshness, no preference
        let profile = ListeningProfile::default();
        let score = personalized_score(&track, &profile, &weights, 365.0, now());
        assert!((score - 0.6).abs() < 1e-9);

        // Liked and played: preference replaces freshness
        let profile = ListeningProfile::new(&["t1"], &["t1"]);
        let score = personalized_score(&track, &profile, &weights, 365.0, now());
        assert!((score - 0.9).abs() < 1e-9);

        // Everything maxed stays within [0, 1]
        let profile = ListeningProfile::new(&[] as &[&str], &["t1"]);
        let score = personalized_score(&track, &profile, &weights, 365.0, now());
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ranking_breaks_ties_by_id() {
        let a = Track::new("a", "x");
        let b = Track::new("b", "x");
        let c = Track::new("c", "x");
        let mut scored = vec![
            ScoredTrack::new(&c, 0.5),
            ScoredTrack::new(&b, 0.5),
            ScoredTrack::new(&a, 0.1),
        ];
        rank(&mut scored);

        let ids: Vec<_> = scored.iter().map(|s| s.track.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }
}
