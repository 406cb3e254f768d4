// Catalog input - the tracks the engine ranks and the user state it personalizes with
// Everything here is loaded once and handed to the engine read-only

pub mod track;

pub use track::{Track, UNKNOWN_GENRE};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// What the user-state store hands us: play events (duplicates matter) and likes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    #[serde(default)]
    pub history: Vec<String>,
    #[serde(default)]
    pub likes: Vec<String>,
}

/// Load a catalog snapshot from a JSON array of tracks
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<Track>, CatalogError> {
    let tracks: Vec<Track> = read_json(path.as_ref())?;

    let undated = count_unparseable_dates(&tracks);
    if undated > 0 {
        warn!(
            "{} of {} tracks have no usable release date, treating them as oldest",
            undated,
            tracks.len()
        );
    }

    info!("Loaded {} tracks from {}", tracks.len(), path.as_ref().display());
    Ok(tracks)
}

pub fn load_user_state<P: AsRef<Path>>(path: P) -> Result<UserState, CatalogError> {
    let state: UserState = read_json(path.as_ref())?;
    info!(
        "Loaded user state: {} plays, {} likes",
        state.history.len(),
        state.likes.len()
    );
    Ok(state)
}

pub fn count_unparseable_dates(tracks: &[Track]) -> usize {
    tracks.iter().filter(|t| t.released_at().is_none()).count()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })
}
