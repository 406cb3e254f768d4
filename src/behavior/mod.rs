// Listening behavior - what the user has played and liked
// The recommender personalizes purely from this: play counts and likes

use std::collections::{HashMap, HashSet};

/// Per-user view of the history/likes lists, indexed for lookups.
///
/// History is a list of play events, so an id showing up five times means five
/// plays. Likes are membership only - order and duplicates don't matter.
#[derive(Debug, Clone, Default)]
pub struct ListeningProfile {
    play_counts: HashMap<String, usize>,
    likes: HashSet<String>,
    total_plays: usize,
}

impl ListeningProfile {
    pub fn new<H, L>(history: &[H], likes: &[L]) -> Self
    where
        H: AsRef<str>,
        L: AsRef<str>,
    {
        let mut play_counts: HashMap<String, usize> = HashMap::new();
        for track_id in history {
            *play_counts.entry(track_id.as_ref().to_string()).or_insert(0) += 1;
        }

        Self {
            play_counts,
            likes: likes.iter().map(|id| id.as_ref().to_string()).collect(),
            total_plays: history.len(),
        }
    }

    pub fn play_count(&self, track_id: &str) -> usize {
        self.play_counts.get(track_id).copied().unwrap_or(0)
    }

    pub fn has_played(&self, track_id: &str) -> bool {
        self.play_count(track_id) > 0
    }

    pub fn is_liked(&self, track_id: &str) -> bool {
        self.likes.contains(track_id)
    }

    /// Played at least `threshold` times and not liked. Likes always win.
    pub fn is_overplayed(&self, track_id: &str, threshold: usize) -> bool {
        !self.is_liked(track_id) && self.play_count(track_id) >= threshold
    }

    /// Explicit signal beats implicit: liked 1.0, played 0.5, unknown 0.0
    pub fn preference(&self, track_id: &str) -> f64 {
        if self.is_liked(track_id) {
            1.0
        } else if self.has_played(track_id) {
            0.5
        } else {
            0.0
        }
    }

    pub fn total_plays(&self) -> usize {
        self.total_plays
    }

    pub fn distinct_tracks(&self) -> usize {
        self.play_counts.len()
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }
}
