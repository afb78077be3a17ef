//! # Chat History
//!
//! Conversation summaries for the history panel, and the messages behind
//! them. The container never reaches for storage directly: the TUI loop
//! calls a [`HistoryStore`] when the container asks for it via an `Effect`.
//!
//! Two stores ship:
//!
//! - [`MemoryHistoryStore`]: lives as long as the process. Optionally seeded
//!   with summaries from the config file.
//! - [`JsonHistoryStore`]: one `<id>.json` file per conversation plus a
//!   `chats.json` index, under `~/.codebot/chats/` by default.
//!
//! Both keep the index most-recently-saved first. JSON writes use atomic
//! rename (write `.tmp`, then `rename()`).

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::message::{ConversationId, Message};

/// Maximum title length (in chars) before truncation with "...".
const MAX_TITLE_CHARS: usize = 60;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub premium: bool,
}

#[derive(Debug)]
pub enum HistoryError {
    Io(io::Error),
    Serde(serde_json::Error),
    /// The id cannot be used as a file name.
    InvalidId(String),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::Io(e) => write!(f, "history I/O error: {e}"),
            HistoryError::Serde(e) => write!(f, "history format error: {e}"),
            HistoryError::InvalidId(id) => write!(f, "invalid conversation id: {id:?}"),
        }
    }
}

impl std::error::Error for HistoryError {}

impl From<io::Error> for HistoryError {
    fn from(e: io::Error) -> Self {
        HistoryError::Io(e)
    }
}

impl From<serde_json::Error> for HistoryError {
    fn from(e: serde_json::Error) -> Self {
        HistoryError::Serde(e)
    }
}

pub trait HistoryStore: Send + Sync {
    /// All known conversations, most recently saved first.
    fn list(&self) -> Result<Vec<ConversationSummary>, HistoryError>;

    /// Messages of one conversation. `Ok(None)` if nothing was ever saved for it.
    fn load(&self, id: &ConversationId) -> Result<Option<Vec<Message>>, HistoryError>;

    /// Save a conversation. Conversations without a user message are skipped.
    /// The title and creation time of an existing entry are kept.
    fn save(
        &self,
        id: &ConversationId,
        messages: &[Message],
        premium: bool,
    ) -> Result<(), HistoryError>;
}

/// Derive a title from the first user message.
/// Returns the first line, truncated to 60 chars.
pub fn derive_title(messages: &[Message]) -> String {
    let Some(first) = messages.iter().find(|m| m.is_user()) else {
        return "Untitled".to_string();
    };
    let first_line = first.content.lines().next().unwrap_or("").trim();
    if first_line.chars().count() > MAX_TITLE_CHARS {
        let head: String = first_line.chars().take(MAX_TITLE_CHARS - 3).collect();
        return format!("{head}...");
    }
    if first_line.is_empty() {
        return "Untitled".to_string();
    }
    first_line.to_string()
}

fn has_user_message(messages: &[Message]) -> bool {
    messages.iter().any(Message::is_user)
}

/// Build the summary to store, keeping title/created_at/premium of `existing`.
fn next_summary(
    id: &ConversationId,
    messages: &[Message],
    premium: bool,
    existing: Option<&ConversationSummary>,
) -> ConversationSummary {
    let now = Utc::now();
    match existing {
        Some(prev) => ConversationSummary {
            updated_at: Some(now),
            ..prev.clone()
        },
        None => ConversationSummary {
            id: id.clone(),
            title: derive_title(messages),
            created_at: messages.first().map(|m| m.created_at).unwrap_or(now),
            updated_at: Some(now),
            premium,
        },
    }
}

/// Move `summary` to the front of `index`, replacing any entry with the same id.
fn promote(index: &mut Vec<ConversationSummary>, summary: ConversationSummary) {
    index.retain(|s| s.id != summary.id);
    index.insert(0, summary);
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Default)]
struct MemoryInner {
    index: Vec<ConversationSummary>,
    chats: HashMap<ConversationId, Vec<Message>>,
}

#[derive(Default)]
pub struct MemoryHistoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose index starts with the given summaries (in that order).
    /// Seeded entries carry no messages.
    pub fn seeded(summaries: Vec<ConversationSummary>) -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                index: summaries,
                chats: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        // A panic while holding the lock leaves plain data behind; keep using it.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn list(&self) -> Result<Vec<ConversationSummary>, HistoryError> {
        Ok(self.lock().index.clone())
    }

    fn load(&self, id: &ConversationId) -> Result<Option<Vec<Message>>, HistoryError> {
        Ok(self.lock().chats.get(id).cloned())
    }

    fn save(
        &self,
        id: &ConversationId,
        messages: &[Message],
        premium: bool,
    ) -> Result<(), HistoryError> {
        if !has_user_message(messages) {
            return Ok(());
        }
        let mut inner = self.lock();
        let existing = inner.index.iter().find(|s| &s.id == id).cloned();
        let summary = next_summary(id, messages, premium, existing.as_ref());
        promote(&mut inner.index, summary);
        inner.chats.insert(id.clone(), messages.to_vec());
        Ok(())
    }
}

// ============================================================================
// JSON file store
// ============================================================================

/// On-disk format of a single conversation.
#[derive(Serialize, Deserialize, Debug)]
struct ChatFile {
    summary: ConversationSummary,
    messages: Vec<Message>,
}

const INDEX_FILE: &str = "chats.json";

pub struct JsonHistoryStore {
    dir: PathBuf,
}

impl JsonHistoryStore {
    /// Store rooted at `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        info!("Chat history directory: {}", dir.display());
        Ok(Self { dir })
    }

    /// Returns `~/.codebot/chats/`.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".codebot").join("chats"))
    }

    fn chat_path(&self, id: &ConversationId) -> Result<PathBuf, HistoryError> {
        let raw = id.as_str();
        let valid = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(HistoryError::InvalidId(raw.to_string()));
        }
        Ok(self.dir.join(format!("{raw}.json")))
    }

    fn read_index(&self) -> Result<Vec<ConversationSummary>, HistoryError> {
        let path = self.dir.join(INDEX_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> Result<(), HistoryError> {
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data)?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

impl HistoryStore for JsonHistoryStore {
    fn list(&self) -> Result<Vec<ConversationSummary>, HistoryError> {
        self.read_index()
    }

    fn load(&self, id: &ConversationId) -> Result<Option<Vec<Message>>, HistoryError> {
        let path = self.chat_path(id)?;
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)?;
        let chat: ChatFile = serde_json::from_str(&json)?;
        debug!("Loaded {} messages from {}", chat.messages.len(), path.display());
        Ok(Some(chat.messages))
    }

    fn save(
        &self,
        id: &ConversationId,
        messages: &[Message],
        premium: bool,
    ) -> Result<(), HistoryError> {
        if !has_user_message(messages) {
            return Ok(());
        }
        let path = self.chat_path(id)?;
        // An unreadable index is left alone rather than rewritten with one entry
        let mut index = self.read_index()?;
        let existing = index.iter().find(|s| &s.id == id).cloned();
        let summary = next_summary(id, messages, premium, existing.as_ref());

        atomic_write_json(
            &path,
            &ChatFile {
                summary: summary.clone(),
                messages: messages.to_vec(),
            },
        )?;

        promote(&mut index, summary);
        atomic_write_json(&self.dir.join(INDEX_FILE), &index)?;
        debug!("Chat saved: {}", id);
        Ok(())
    }
}
