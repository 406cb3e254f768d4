// B-Sides Library - recommendation engine behind the streaming client's home screen
// Pure ranking core, with config and catalog loading around it

pub mod behavior; // play counts and likes per user
pub mod catalog;  // track model, catalog/user-state loading
pub mod config;   // engine tuning and logging settings
pub mod engine;   // the four shelves and their scoring

// Export the stuff callers actually use
pub use behavior::ListeningProfile;
pub use catalog::{Track, UserState};
pub use config::{Config, EngineConfig, ScoringWeights};
pub use engine::{
    generate_featured_tracks, generate_new_releases, generate_recommendations,
    generate_trending_tracks, RecommendationEngine, Shelves, DEFAULT_COUNT,
};
