use super::scoring::{self, ScoredTrack};
use super::shuffle::pick_from_window;
use crate::behavior::ListeningProfile;
use crate::catalog::Track;
use crate::config::EngineConfig;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Most tracks a single artist may place in a list of `count`
pub fn max_tracks_per_artist(count: usize, ratio: f64) -> usize {
    ((count as f64 * ratio).floor() as usize).max(1)
}

/// Score every track the user hasn't worn out, best first.
pub fn score_eligible<'a>(
    all_tracks: &'a [Track],
    profile: &ListeningProfile,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Vec<ScoredTrack<'a>> {
    let mut scored: Vec<ScoredTrack<'a>> = all_tracks
        .iter()
        .filter(|track| !profile.is_overplayed(&track.id, config.overplay_threshold))
        .map(|track| {
            let score = scoring::personalized_score(
                track,
                profile,
                &config.weights,
                config.recency_horizon_days,
                now,
            );
            ScoredTrack::new(track, score)
        })
        .collect();

    scoring::rank(&mut scored);
    scored
}

/// Walk the ranking and keep at most `max_per_artist` per artist, collecting up
/// to `limit` candidates. If that leaves fewer than `count`, top up from the
/// ranking regardless of artist unless `strict` is set.
pub fn enforce_diversity<'a>(
    ranked: &[ScoredTrack<'a>],
    count: usize,
    limit: usize,
    max_per_artist: usize,
    strict: bool,
) -> Vec<ScoredTrack<'a>> {
    let mut diverse: Vec<ScoredTrack<'a>> = Vec::with_capacity(limit.min(ranked.len()));
    let mut taken: HashSet<usize> = HashSet::new();
    let mut per_artist: HashMap<&str, usize> = HashMap::new();

    for (idx, candidate) in ranked.iter().enumerate() {
        if diverse.len() >= limit {
            break;
        }

        let artist_count = per_artist
            .entry(candidate.track.artist_id.as_str())
            .or_insert(0);
        if *artist_count < max_per_artist {
            *artist_count += 1;
            diverse.push(*candidate);
            taken.insert(idx);
        }
    }

    if diverse.len() < count && !strict {
        let before = diverse.len();
        for (idx, candidate) in ranked.iter().enumerate() {
            if diverse.len() >= limit {
                break;
            }
            if !taken.contains(&idx) {
                diverse.push(*candidate);
            }
        }
        debug!(
            "Artist cap left {} of {} slots filled, topped up to {}",
            before,
            count,
            diverse.len()
        );
    }

    diverse
}

/// Keep the top `head` in score order, then fill the rest with random picks
/// from a small window at the front of what's left.
pub fn assemble<T, R: Rng + ?Sized>(
    candidates: Vec<T>,
    count: usize,
    head: usize,
    window: usize,
    rng: &mut R,
) -> Vec<T> {
    let mut pool = candidates;
    let head = head.min(count).min(pool.len());
    let mut out: Vec<T> = pool.drain(..head).collect();

    while out.len() < count {
        match pick_from_window(&mut pool, window, rng) {
            Some(item) => out.push(item),
            None => break,
        }
    }

    out
}

/// Full personalized pipeline: filter, score, rank, diversify, assemble.
pub fn recommend<R: Rng + ?Sized>(
    all_tracks: &[Track],
    profile: &ListeningProfile,
    count: usize,
    config: &EngineConfig,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Track> {
    if count == 0 || all_tracks.is_empty() {
        return Vec::new();
    }

    let ranked = score_eligible(all_tracks, profile, config, now);
    debug!(
        "Scored {} eligible tracks ({} rested as overplayed)",
        ranked.len(),
        all_tracks.len() - ranked.len()
    );
    if ranked.is_empty() {
        return Vec::new();
    }

    let max_per_artist = max_tracks_per_artist(count, config.artist_cap_ratio);
    let limit = count.saturating_mul(config.candidate_multiplier);
    let diverse = enforce_diversity(
        &ranked,
        count,
        limit,
        max_per_artist,
        config.strict_artist_cap,
    );

    let head = (count as f64 * config.deterministic_ratio).floor() as usize;
    assemble(diverse, count, head, config.pick_window, rng)
        .into_iter()
        .map(|scored| scored.track.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn track(id: &str, artist: &str, plays: i64) -> Track {
        Track::new(id, artist)
            .with_release_date("2025-05-01")
            .with_counts(plays, plays / 10)
    }

    /// 10 artists with 5 tracks each, popularity descending by index
    fn catalog() -> Vec<Track> {
        (0..50)
            .map(|i| track(&format!("t{:02}", i), &format!("a{}", i % 10), 1_000_000 - i * 10_000))
            .collect()
    }

    fn run(
        tracks: &[Track],
        history: &[&str],
        likes: &[&str],
        count: usize,
        seed: u64,
    ) -> Vec<Track> {
        let profile = ListeningProfile::new(history, likes);
        let mut rng = StdRng::seed_from_u64(seed);
        recommend(tracks, &profile, count, &EngineConfig::default(), now(), &mut rng)
    }

    #[test]
    fn test_artist_cap_formula() {
        assert_eq!(max_tracks_per_artist(10, 0.3), 3);
        assert_eq!(max_tracks_per_artist(3, 0.3), 1);
        assert_eq!(max_tracks_per_artist(1, 0.3), 1);
        assert_eq!(max_tracks_per_artist(20, 0.3), 6);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(run(&[], &[], &[], 10, 1).is_empty());
        assert!(run(&catalog(), &[], &[], 0, 1).is_empty());
    }

    #[test]
    fn test_output_bounded_and_from_catalog() {
        let tracks = catalog();
        let ids: HashSet<&str> = tracks.iter().map(|t| t.id.as_str()).collect();

        for count in [1, 5, 10, 30, 80] {
            let out = run(&tracks, &["t01", "t02"], &["t03"], count, count as u64);
            assert_eq!(out.len(), count.min(tracks.len()));
            assert!(out.iter().all(|t| ids.contains(t.id.as_str())));

            let unique: HashSet<&str> = out.iter().map(|t| t.id.as_str()).collect();
            assert_eq!(unique.len(), out.len());
        }
    }

    #[test]
    fn test_per_artist_cap_holds_with_diverse_catalog() {
        let tracks = catalog();
        for seed in 0..20 {
            let out = run(&tracks, &[], &[], 10, seed);
            let mut per_artist: HashMap<&str, usize> = HashMap::new();
            for t in &out {
                *per_artist.entry(t.artist_id.as_str()).or_insert(0) += 1;
            }
            assert!(per_artist.values().all(|&n| n <= 3), "{:?}", per_artist);
        }
    }

    #[test]
    fn test_overplayed_track_excluded_unless_liked() {
        let tracks = vec![track("t1", "a1", 900_000), track("t2", "a2", 10), track("t3", "a3", 10)];
        let history = ["t1"; 5];

        let out = run(&tracks, &history, &[], 10, 9);
        assert!(out.iter().all(|t| t.id != "t1"));
        assert_eq!(out.len(), 2);

        let out = run(&tracks, &history, &["t1"], 10, 9);
        assert!(out.iter().any(|t| t.id == "t1"));

        // Four plays is still fine
        let out = run(&tracks, &history[..4], &[], 10, 9);
        assert!(out.iter().any(|t| t.id == "t1"));
    }

    #[test]
    fn test_everything_overplayed_gives_nothing() {
        let tracks = vec![track("t1", "a1", 10), track("t2", "a2", 10)];
        let mut history = vec!["t1"; 5];
        history.extend(["t2"; 6]);
        assert!(run(&tracks, &history, &[], 10, 2).is_empty());
    }

    #[test]
    fn test_single_artist_catalog_returns_everything() {
        let tracks = vec![track("t1", "a1", 10), track("t2", "a1", 20), track("t3", "a1", 30)];
        let out = run(&tracks, &[], &[], 10, 4);
        let mut ids: Vec<_> = out.iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_top_half_is_deterministic() {
        let tracks = catalog();
        let profile = ListeningProfile::default();
        let ranked = score_eligible(&tracks, &profile, &EngineConfig::default(), now());

        // Top of the ranking: one per artist until the cap kicks in, so the first
        // five picks are simply the five best tracks
        let expected: Vec<&str> = ranked.iter().take(5).map(|s| s.track.id.as_str()).collect();
        for seed in 0..10 {
            let out = run(&tracks, &[], &[], 10, seed);
            let head: Vec<&str> = out.iter().take(5).map(|t| t.id.as_str()).collect();
            assert_eq!(head, expected);
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let tracks = catalog();
        let a = run(&tracks, &["t04"], &["t07"], 12, 77);
        let b = run(&tracks, &["t04"], &["t07"], 12, 77);
        assert_eq!(a, b);
    }

    #[test]
    fn test_liked_track_outranks_unheard_peer() {
        let tracks = vec![track("t1", "a1", 100), track("t2", "a2", 100)];
        let profile = ListeningProfile::new(&["t2"], &["t2"]);
        let ranked = score_eligible(&tracks, &profile, &EngineConfig::default(), now());
        assert_eq!(ranked[0].track.id, "t2");
    }

    #[test]
    fn test_diversity_top_up_and_strict_mode() {
        // Two artists, count 10: cap of 3 each only admits 6 on the first pass
        let tracks: Vec<Track> = (0..12)
            .map(|i| track(&format!("t{:02}", i), if i % 2 == 0 { "a1" } else { "a2" }, 1000 - i))
            .collect();
        let profile = ListeningProfile::default();
        let ranked = score_eligible(&tracks, &profile, &EngineConfig::default(), now());

        let relaxed = enforce_diversity(&ranked, 10, 20, 3, false);
        assert_eq!(relaxed.len(), 12);
        let strict = enforce_diversity(&ranked, 10, 20, 3, true);
        assert_eq!(strict.len(), 6);

        // First-pass picks keep their ranking order at the front
        let first: Vec<&str> = relaxed.iter().take(6).map(|s| s.track.id.as_str()).collect();
        let strict_ids: Vec<&str> = strict.iter().map(|s| s.track.id.as_str()).collect();
        assert_eq!(first, strict_ids);
    }

    #[test]
    fn test_diversity_stops_at_limit() {
        let tracks = catalog();
        let profile = ListeningProfile::default();
        let ranked = score_eligible(&tracks, &profile, &EngineConfig::default(), now());
        let diverse = enforce_diversity(&ranked, 5, 10, 1, false);
        assert_eq!(diverse.len(), 10);
    }

    #[test]
    fn test_assemble_randomizes_only_the_tail() {
        let candidates: Vec<u32> = (0..20).collect();
        let mut rng = StdRng::seed_from_u64(11);
        let out = assemble(candidates, 10, 5, 10, &mut rng);

        assert_eq!(out.len(), 10);
        assert_eq!(&out[..5], &[0, 1, 2, 3, 4]);
        // Each tail pick comes from the next ten still available, so nothing past 19
        assert!(out[5..].iter().all(|&n| (5..20).contains(&n)));

        let short = assemble(vec![1u32, 2, 3], 10, 5, 10, &mut rng);
        assert_eq!(short.len(), 3);
    }
}
