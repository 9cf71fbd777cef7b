//! Session persistence
//!
//! Sessions are the hand-off record between the pipeline and the gallery
//! screens. The store itself is a collaborator contract ([`SessionStore`]);
//! [`JsonSessionStore`] is the file-backed reference implementation, keeping
//! the whole catalog as one JSON document with the newest session first.

use crate::error::{Result, StudioError};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Capture mode a session was shot in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Guided multi-angle capture
    Guided,
    /// Free-form capture
    Free,
}

/// One image slot within a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionImage {
    /// Stable angle identifier
    pub angle_id: String,
    /// Human-readable angle label
    pub label: String,
    /// Reference to the captured frame (path or URL, owned by the app shell)
    pub before: String,
    /// Reference to the enhanced frame, once produced
    pub after: Option<String>,
}

/// A capture session as persisted for the gallery screens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarSession {
    /// Unique session id
    pub id: String,
    /// User-visible title
    pub title: String,
    /// Session creation time
    pub date: DateTime<Utc>,
    /// Capture mode used
    pub mode: CaptureMode,
    /// Image slots, in capture order
    pub images: Vec<SessionImage>,
    /// Whether background removal has run for this session
    pub backgrounds_removed: bool,
    /// Whether a showroom backdrop has been applied
    pub showroom_applied: bool,
}

/// Key-value store contract for session records
pub trait SessionStore {
    /// Persist a new session, newest first
    ///
    /// # Errors
    /// Storage write failures.
    fn save(&self, session: &CarSession) -> Result<()>;

    /// All sessions, newest first
    ///
    /// # Errors
    /// Storage read failures.
    fn list_all(&self) -> Result<Vec<CarSession>>;

    /// Look up one session by id
    ///
    /// # Errors
    /// Storage read failures; an unknown id is `Ok(None)`.
    fn get_by_id(&self, id: &str) -> Result<Option<CarSession>>;

    /// Replace a stored session with the same id
    ///
    /// # Errors
    /// `InvalidConfig` when the id is unknown, otherwise storage failures.
    fn update(&self, session: &CarSession) -> Result<()>;

    /// Remove a session by id; removing an unknown id is a no-op
    ///
    /// # Errors
    /// Storage write failures.
    fn delete(&self, id: &str) -> Result<()>;
}

/// File-backed JSON implementation of [`SessionStore`]
pub struct JsonSessionStore {
    path: PathBuf,
}

impl JsonSessionStore {
    /// Create a store backed by the given file; the file is created lazily
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn load(&self) -> Result<Vec<CarSession>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&raw)
            .map_err(|e| StudioError::device_io(format!("corrupt session catalog: {e}")))
    }

    fn persist(&self, sessions: &[CarSession]) -> Result<()> {
        let raw = serde_json::to_string_pretty(sessions)
            .map_err(|e| StudioError::device_io(format!("failed to serialize sessions: {e}")))?;
        std::fs::write(&self.path, raw)?;
        debug!("persisted {} sessions to {}", sessions.len(), self.path.display());
        Ok(())
    }
}

impl SessionStore for JsonSessionStore {
    fn save(&self, session: &CarSession) -> Result<()> {
        let mut sessions = self.load()?;
        sessions.insert(0, session.clone());
        self.persist(&sessions)
    }

    fn list_all(&self) -> Result<Vec<CarSession>> {
        self.load()
    }

    fn get_by_id(&self, id: &str) -> Result<Option<CarSession>> {
        Ok(self.load()?.into_iter().find(|s| s.id == id))
    }

    fn update(&self, session: &CarSession) -> Result<()> {
        let mut sessions = self.load()?;
        let slot = sessions
            .iter_mut()
            .find(|s| s.id == session.id)
            .ok_or_else(|| {
                StudioError::invalid_config(format!("unknown session id '{}'", session.id))
            })?;
        *slot = session.clone();
        self.persist(&sessions)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut sessions = self.load()?;
        sessions.retain(|s| s.id != id);
        self.persist(&sessions)
    }
}

/// Generate a unique session id from the clock and a process-local counter
#[must_use]
pub fn generate_session_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("session_{}_{:04}", Utc::now().timestamp_millis(), seq)
}
