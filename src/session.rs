//! Persisted session state, the stand-in for browser local storage.
//!
//! A single JSON file holds the identity the server issued on join. It is
//! only ever used to attempt reconnection within a short validity window
//! after a disconnect; anything older is discarded unused.

use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::PlayerInfo;

/// How long a saved session stays usable for automatic reconnection. Matches
/// the server-side disconnect grace period.
pub const SESSION_VALIDITY_SECS: i64 = 30;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to write session file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The locally cached identity: `{session_token, player_id, game_id,
/// username}` plus the capture timestamp the validity window runs from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SavedSession {
    pub session_token: String,
    pub player_id: String,
    pub game_id: String,
    pub username: String,
    pub saved_at: DateTime<Utc>,
}

impl SavedSession {
    pub fn from_player_info(info: &PlayerInfo, now: DateTime<Utc>) -> Self {
        Self {
            session_token: info.session_token.clone(),
            player_id: info.player_id.clone(),
            game_id: info.game_id.clone(),
            username: info.username.clone(),
            saved_at: now,
        }
    }

    /// Whether the session is still inside its validity window at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.saved_at) <= Duration::seconds(SESSION_VALIDITY_SECS)
    }
}

/// File-backed store for at most one [`SavedSession`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Read the stored session, if any. An unreadable or corrupt file is
    /// treated as no session (and logged), never as an error.
    pub fn load(&self) -> Option<SavedSession> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Could not read session file {}: {}", self.path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Discarding corrupt session file {}: {}", self.path.display(), e);
                self.clear();
                None
            }
        }
    }

    pub fn save(&self, session: &SavedSession) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SessionError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, raw).map_err(|source| SessionError::Write {
            path: self.path.clone(),
            source,
        })?;
        info!("Saved session for {} to {}", session.username, self.path.display());
        Ok(())
    }

    /// Remove the stored session. Missing files are fine; other failures are
    /// logged and otherwise ignored, the session is disposable state.
    pub fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => info!("Cleared stored session"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove session file {}: {}", self.path.display(), e),
        }
    }
}
