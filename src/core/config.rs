//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.codebot/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use chrono::{Duration as ChronoDuration, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::assistant::{DEFAULT_PLACEHOLDER, DEFAULT_REPLY_DELAY, DEFAULT_REPLY_TIMEOUT};
use crate::core::history::ConversationSummary;
use crate::core::message::ConversationId;
use crate::core::state::{DEFAULT_GREETING, DEFAULT_NEW_CHAT_GREETING};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CodebotConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub premium: Option<bool>,
    pub greeting: Option<String>,
    pub new_chat_greeting: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AssistantConfig {
    pub reply_delay_ms: Option<u64>,
    pub reply_timeout_secs: Option<u64>,
    pub placeholder: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HistoryConfig {
    pub persist: Option<bool>,
    #[serde(default)]
    pub seed: Vec<SeedEntry>,
}

/// A sample history entry shown in the panel (in-memory history only).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedEntry {
    pub title: String,
    #[serde(default)]
    pub premium: bool,
    #[serde(default)]
    pub hours_ago: u32,
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub premium: bool,
    pub greeting: String,
    pub new_chat_greeting: String,
    pub reply_delay: Duration,
    pub reply_timeout: Duration,
    pub placeholder: String,
    pub persist_history: bool,
    pub history_seed: Vec<SeedEntry>,
}

impl ResolvedConfig {
    /// Seed entries as summaries, ids `"1"`, `"2"`, ... in file order.
    pub fn seed_summaries(&self) -> Vec<ConversationSummary> {
        let now = Utc::now();
        self.history_seed
            .iter()
            .enumerate()
            .map(|(i, entry)| ConversationSummary {
                id: ConversationId::new((i + 1).to_string()),
                title: entry.title.clone(),
                created_at: now - ChronoDuration::hours(i64::from(entry.hours_ago)),
                updated_at: None,
                premium: entry.premium,
            })
            .collect()
    }
}

/// Overrides taken from the command line (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub premium: Option<bool>,
    pub persist_history: Option<bool>,
    pub reply_delay_ms: Option<u64>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.codebot/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".codebot").join("config.toml"))
}

/// Load config from `~/.codebot/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `CodebotConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<CodebotConfig, ConfigError> {
    let Some(path) = config_path() else {
        warn!("Could not determine home directory, using default config");
        return Ok(CodebotConfig::default());
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<CodebotConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(CodebotConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: CodebotConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# CodeBot Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# premium = false                    # Or set CODEBOT_PREMIUM=1
# greeting = "Hello! I'm your AI coding assistant."
# new_chat_greeting = "What would you like to work on in this new chat?"

# [assistant]
# reply_delay_ms = 1500              # Or set CODEBOT_REPLY_DELAY_MS
# reply_timeout_secs = 30
# placeholder = "This is where your AI system would answer."

# [history]
# persist = false                    # true = keep chats in ~/.codebot/chats/

# [[history.seed]]
# title = "React useEffect hook explanation"
# premium = true
# hours_ago = 2

# [[history.seed]]
# title = "Python list comprehension help"
# hours_ago = 24
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Parse a boolean env value ("1", "true", "yes", "on" / "0", "false", "no", "off").
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let raw = std::env::var(name).ok()?;
    let parsed = parse_flag(&raw);
    if parsed.is_none() {
        warn!("Ignoring {}={:?}: not a boolean", name, raw);
    }
    parsed
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &CodebotConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Premium: CLI → env → config → default
    let premium = cli
        .premium
        .or_else(|| env_flag("CODEBOT_PREMIUM"))
        .or(config.general.premium)
        .unwrap_or(false);

    // Reply delay: CLI → env → config → default
    let reply_delay = cli
        .reply_delay_ms
        .or_else(|| {
            std::env::var("CODEBOT_REPLY_DELAY_MS")
                .ok()
                .and_then(|v| v.trim().parse().ok())
        })
        .or(config.assistant.reply_delay_ms)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_REPLY_DELAY);

    // Persistence: CLI → env → config → default
    let persist_history = cli
        .persist_history
        .or_else(|| env_flag("CODEBOT_PERSIST_HISTORY"))
        .or(config.history.persist)
        .unwrap_or(false);

    ResolvedConfig {
        premium,
        greeting: config
            .general
            .greeting
            .clone()
            .unwrap_or_else(|| DEFAULT_GREETING.to_string()),
        new_chat_greeting: config
            .general
            .new_chat_greeting
            .clone()
            .unwrap_or_else(|| DEFAULT_NEW_CHAT_GREETING.to_string()),
        reply_delay,
        reply_timeout: config
            .assistant
            .reply_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REPLY_TIMEOUT),
        placeholder: config
            .assistant
            .placeholder
            .clone()
            .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string()),
        persist_history,
        history_seed: config.history.seed.clone(),
    }
}
