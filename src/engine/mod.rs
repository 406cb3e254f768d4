// Recommendation engine - turns the catalog plus a listening profile into shelves
// Pure functions over borrowed input; the only side channel is the rng you pass in

mod featured;     // genre-balanced picks, shuffled
mod new_releases; // newest first with older backfill
mod personalized; // scored, diversified, partly randomized
mod scoring;      // shared scoring primitives
mod shuffle;      // fisher-yates + windowed random pick
mod trending;     // popularity damped by age

use crate::behavior::ListeningProfile;
use crate::catalog::Track;
use crate::config::{ConfigError, EngineConfig};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Shelf size the client asks for when it doesn't say
pub const DEFAULT_COUNT: usize = 10;

/// Everything the home screen renders, in one go
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shelves {
    pub recommended: Vec<Track>,
    pub trending: Vec<Track>,
    pub new_releases: Vec<Track>,
    pub featured: Vec<Track>,
}

/// Ranks a catalog into shelves. Scores stay internal; every shelf is plain tracks.
///
/// ```compile_fail
/// use bsides::engine::scoring::ScoredTrack;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: EngineConfig,
    reference_time: Option<DateTime<Utc>>, // pinned "now", mostly for tests and replays
}

impl RecommendationEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            reference_time: None,
        })
    }

    /// Evaluate ages against a fixed instant instead of the wall clock
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }

    pub fn recommend<R: Rng + ?Sized>(
        &self,
        all_tracks: &[Track],
        profile: &ListeningProfile,
        count: usize,
        rng: &mut R,
    ) -> Vec<Track> {
        personalized::recommend(all_tracks, profile, count, &self.config, self.now(), rng)
    }

    pub fn trending(&self, all_tracks: &[Track], count: usize) -> Vec<Track> {
        trending::trending(all_tracks, count, &self.config, self.now())
    }

    pub fn new_releases(&self, all_tracks: &[Track], count: usize) -> Vec<Track> {
        new_releases::new_releases(
            all_tracks,
            count,
            self.config.new_release_window_days,
            self.now(),
        )
    }

    pub fn featured<R: Rng + ?Sized>(
        &self,
        all_tracks: &[Track],
        count: usize,
        rng: &mut R,
    ) -> Vec<Track> {
        featured::featured(all_tracks, count, self.config.tracks_per_genre, rng)
    }

    /// Run every pipeline against the same instant
    pub fn build_shelves<R: Rng + ?Sized>(
        &self,
        all_tracks: &[Track],
        profile: &ListeningProfile,
        count: usize,
        rng: &mut R,
    ) -> Shelves {
        let pinned = self.clone().at(self.now());

        let shelves = Shelves {
            recommended: pinned.recommend(all_tracks, profile, count, rng),
            trending: pinned.trending(all_tracks, count),
            new_releases: pinned.new_releases(all_tracks, count),
            featured: pinned.featured(all_tracks, count, rng),
        };

        debug!(
            "Built shelves from {} tracks: {} recommended, {} trending, {} new, {} featured",
            all_tracks.len(),
            shelves.recommended.len(),
            shelves.trending.len(),
            shelves.new_releases.len(),
            shelves.featured.len()
        );
        shelves
    }
}

// Client-facing shortcuts: default config, wall clock, thread rng

pub fn generate_recommendations<H: AsRef<str>, L: AsRef<str>>(
    all_tracks: &[Track],
    user_history: &[H],
    user_likes: &[L],
    count: usize,
) -> Vec<Track> {
    let profile = ListeningProfile::new(user_history, user_likes);
    let mut rng = rand::thread_rng();
    RecommendationEngine::default().recommend(all_tracks, &profile, count, &mut rng)
}

pub fn generate_trending_tracks(all_tracks: &[Track], count: usize) -> Vec<Track> {
    RecommendationEngine::default().trending(all_tracks, count)
}

pub fn generate_new_releases(all_tracks: &[Track], count: usize) -> Vec<Track> {
    RecommendationEngine::default().new_releases(all_tracks, count)
}

pub fn generate_featured_tracks(all_tracks: &[Track], count: usize) -> Vec<Track> {
    RecommendationEngine::default().featured(all_tracks, count, &mut rand::thread_rng())
}
