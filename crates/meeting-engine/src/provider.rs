//! The data provider contract and its in-memory / JSON-file implementation.
//!
//! Scheduling components only read through [`DataProvider`]; the single write path
//! is [`DataProvider::commit_meeting`], which re-validates availability under the
//! provider's own lock so that a search-then-commit cannot double-book.

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, ScheduleError};
use crate::model::{Meeting, User};

/// Outcome of a transactional commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// A participant already has a meeting overlapping the new one.
    Conflict { meeting_id: String },
    /// A meeting with the same id is already stored.
    DuplicateId { meeting_id: String },
}

/// Source of truth for users and meetings.
pub trait DataProvider: Send + Sync {
    fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    fn get_meeting(&self, meeting_id: &str) -> Result<Option<Meeting>>;

    /// Every meeting the user participates in, in no particular order.
    fn get_user_meetings(&self, user_id: &str) -> Result<Vec<Meeting>>;

    /// Store `meeting` if its id is unused, every participant resolves and none of
    /// them has an overlapping meeting (exclusive boundaries). A failed commit leaves
    /// the store unchanged.
    fn commit_meeting(&self, meeting: Meeting) -> Result<CommitOutcome>;
}

/// Resolve a user or fail with [`ScheduleError::UserNotFound`].
pub fn require_user(provider: &dyn DataProvider, user_id: &str) -> Result<User> {
    provider
        .get_user(user_id)?
        .ok_or_else(|| ScheduleError::UserNotFound(user_id.to_string()))
}

/// On-disk layout of the meeting data file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub meetings: Vec<Meeting>,
}

#[derive(Debug, Default)]
struct StoreState {
    data: StoreData,
    users: HashMap<String, usize>,
}

impl StoreState {
    /// Index `data`, rejecting duplicate ids and malformed meetings.
    fn new(data: StoreData) -> Result<Self> {
        let mut users = HashMap::with_capacity(data.users.len());
        for (i, user) in data.users.iter().enumerate() {
            if users.insert(user.id.clone(), i).is_some() {
                return Err(ScheduleError::DuplicateUser(user.id.clone()));
            }
        }

        let mut meeting_ids = HashSet::with_capacity(data.meetings.len());
        for meeting in &data.meetings {
            meeting.validate()?;
            if !meeting_ids.insert(meeting.id.as_str()) {
                return Err(ScheduleError::DuplicateMeeting(meeting.id.clone()));
            }
        }

        Ok(Self { data, users })
    }

    fn user(&self, user_id: &str) -> Option<&User> {
        self.users.get(user_id).map(|&i| &self.data.users[i])
    }
}

/// An `RwLock`-guarded snapshot of users and meetings, optionally persisted to a
/// JSON file on every successful commit.
#[derive(Debug, Default)]
pub struct MeetingStore {
    state: RwLock<StoreState>,
    path: Option<PathBuf>,
}

impl MeetingStore {
    /// Build an in-memory store.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate user or meeting id, or on a meeting without participants
    /// or with `end <= start`.
    pub fn new(users: Vec<User>, meetings: Vec<Meeting>) -> Result<Self> {
        Ok(Self {
            state: RwLock::new(StoreState::new(StoreData { users, meetings })?),
            path: None,
        })
    }

    /// Build an in-memory store from the JSON data-file layout, validated as in
    /// [`MeetingStore::new`].
    pub fn from_json(json: &str) -> Result<Self> {
        let data: StoreData = serde_json::from_str(json)?;
        Ok(Self {
            state: RwLock::new(StoreState::new(data)?),
            path: None,
        })
    }

    /// Load the store from `path`. With `persist_on_write`, commits are written back.
    pub fn open(path: impl AsRef<Path>, persist_on_write: bool) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut store = Self::from_json(&content)?;
        {
            let state = store.read();
            info!(
                path = %path.display(),
                users = state.data.users.len(),
                meetings = state.data.meetings.len(),
                "loaded meeting data"
            );
        }
        if persist_on_write {
            store.path = Some(path.to_path_buf());
        }
        Ok(store)
    }

    /// A copy of everything currently stored.
    pub fn snapshot(&self) -> StoreData {
        self.read().data.clone()
    }

    pub fn meeting_count(&self) -> usize {
        self.read().data.meetings.len()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, StoreState> {
        // Writers publish only fully validated state, so a poisoned lock still guards
        // consistent data.
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write `data` to a temporary file beside `path`, then rename it into place.
    fn persist(&self, path: &Path, data: &StoreData) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        let storage_err = |e: std::io::Error| {
            ScheduleError::Storage(format!("failed to write {}: {}", path.display(), e))
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(storage_err)?;
        file.write_all(json.as_bytes()).map_err(storage_err)?;
        file.as_file().sync_all().map_err(storage_err)?;
        file.persist(path).map_err(|e| storage_err(e.error))?;
        Ok(())
    }
}

impl DataProvider for MeetingStore {
    fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.read().user(user_id).cloned())
    }

    fn get_meeting(&self, meeting_id: &str) -> Result<Option<Meeting>> {
        Ok(self
            .read()
            .data
            .meetings
            .iter()
            .find(|m| m.id == meeting_id)
            .cloned())
    }

    fn get_user_meetings(&self, user_id: &str) -> Result<Vec<Meeting>> {
        Ok(self
            .read()
            .data
            .meetings
            .iter()
            .filter(|m| m.has_participant(user_id))
            .cloned()
            .collect())
    }

    fn commit_meeting(&self, meeting: Meeting) -> Result<CommitOutcome> {
        meeting.validate()?;
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if state.data.meetings.iter().any(|m| m.id == meeting.id) {
            warn!(meeting = %meeting.id, "commit rejected: meeting id already in use");
            return Ok(CommitOutcome::DuplicateId {
                meeting_id: meeting.id,
            });
        }

        if let Some(missing) = meeting.participants.iter().find(|p| state.user(p).is_none()) {
            return Err(ScheduleError::UserNotFound(missing.clone()));
        }

        let clash = state.data.meetings.iter().find(|existing| {
            existing.overlaps(meeting.start, meeting.end)
                && meeting.participants.iter().any(|p| existing.has_participant(p))
        });
        if let Some(existing) = clash {
            warn!(
                meeting = %meeting.id,
                conflicts_with = %existing.id,
                "commit rejected: slot no longer free"
            );
            return Ok(CommitOutcome::Conflict {
                meeting_id: existing.id.clone(),
            });
        }

        if let Some(path) = &self.path {
            let mut next = state.data.clone();
            next.meetings.push(meeting.clone());
            self.persist(path, &next)?;
            debug!(path = %path.display(), "persisted meeting data");
        }

        info!(meeting = %meeting.id, start = %meeting.start, "meeting committed");
        state.data.meetings.push(meeting);
        Ok(CommitOutcome::Committed)
    }
}
