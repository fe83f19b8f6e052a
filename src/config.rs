// src/config.rs
//! Environment-sourced configuration plus the keyword allow-list loader.

use std::path::Path;
use std::time::Duration;

use chrono::Duration as ChronoDuration;

use crate::error::{Error, Result};

// --- env names ---
pub const ENV_BOT_TOKEN: &str = "BOT_TOKEN";
pub const ENV_CHANNEL: &str = "CHANNEL_USERNAME";
pub const ENV_TOGETHER_API_KEY: &str = "TOGETHER_API_KEY";
pub const ENV_ADMIN_ID: &str = "ADMIN_ID";
pub const ENV_TOGETHER_MODEL: &str = "TOGETHER_MODEL";
pub const ENV_LEDGER_PATH: &str = "LEDGER_PATH";
pub const ENV_KEYWORDS_PATH: &str = "KEYWORDS_PATH";

pub const DEFAULT_MODEL: &str = "mistralai/Mixtral-8x7B-Instruct-v0.1";
pub const DEFAULT_LEDGER_PATH: &str = "sent_links.txt";

/// One full pass over all feeds every 10 minutes.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(600);

/// Entries older than this are never published.
pub const FRESHNESS_WINDOW_HOURS: i64 = 24;

/// Only the newest N entries of each feed are considered per cycle.
pub const MAX_ENTRIES_PER_FEED: usize = 5;

pub const RSS_FEEDS: &[&str] = &[
    "https://www.inform.kz/ru/politics_rss.xml",
    "https://tengrinews.kz/rss",
    "https://lsm.kz/rss",
];

/// Place-name keywords used by the topicality gate when no keyword file is
/// configured. Matching is lowercase-substring, so these stay lowercase.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "казахстан",
    "астана",
    "алматы",
    "шымкент",
    "караганда",
    "актау",
    "тараз",
    "петропавловск",
    "костанай",
    "кызылорда",
    "усть-каменогорск",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub channel: String,
    pub together_api_key: String,
    pub together_model: String,
    /// Chat id for operational alerts. `None` disables alerting.
    pub admin_id: Option<i64>,
    pub ledger_path: String,
    pub keywords: Vec<String>,
}

impl Config {
    /// Read configuration from the environment. Missing required variables
    /// are a fatal `Error::Config`.
    pub fn from_env() -> Result<Self> {
        let bot_token = require(ENV_BOT_TOKEN)?;
        let channel = require(ENV_CHANNEL)?;
        let together_api_key = require(ENV_TOGETHER_API_KEY)?;

        let admin_id = match std::env::var(ENV_ADMIN_ID) {
            Ok(raw) => Some(raw.trim().parse::<i64>().map_err(|_| {
                Error::Config(format!("{ENV_ADMIN_ID} must be a numeric chat id"))
            })?),
            Err(_) => None,
        };

        let together_model =
            std::env::var(ENV_TOGETHER_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let ledger_path =
            std::env::var(ENV_LEDGER_PATH).unwrap_or_else(|_| DEFAULT_LEDGER_PATH.to_string());

        let keywords = load_keywords_default()?;

        Ok(Self {
            bot_token,
            channel,
            together_api_key,
            together_model,
            admin_id,
            ledger_path,
            keywords,
        })
    }

    pub fn freshness_window(&self) -> ChronoDuration {
        ChronoDuration::hours(FRESHNESS_WINDOW_HOURS)
    }
}

fn require(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::Config(format!("missing required env var {name}"))),
    }
}

pub fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect()
}

/// Resolve the keyword list:
/// 1) $KEYWORDS_PATH (must exist if set)
/// 2) config/keywords.toml
/// 3) built-in default list
pub fn load_keywords_default() -> Result<Vec<String>> {
    if let Ok(p) = std::env::var(ENV_KEYWORDS_PATH) {
        return load_keywords_from(Path::new(&p));
    }
    let conventional = Path::new("config/keywords.toml");
    if conventional.exists() {
        return load_keywords_from(conventional);
    }
    Ok(default_keywords())
}

/// Load the keyword allow-list from a TOML file: `keywords = ["..."]`.
/// Entries are trimmed, lowercased and deduplicated.
pub fn load_keywords_from(path: &Path) -> Result<Vec<String>> {
    #[derive(serde::Deserialize)]
    struct KeywordsFile {
        keywords: Vec<String>,
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("reading keywords from {}: {e}", path.display()))
    })?;
    let parsed: KeywordsFile = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("parsing {}: {e}", path.display())))?;

    let list = clean_list(parsed.keywords);
    if list.is_empty() {
        return Err(Error::Config(format!(
            "{} contains no usable keywords",
            path.display()
        )));
    }
    Ok(list)
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    use std::collections::BTreeSet;
    let mut set = BTreeSet::new();
    for it in items {
        let t = it.trim().to_lowercase();
        if !t.is_empty() {
            set.insert(t);
        }
    }
    set.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_list_trims_lowercases_and_dedups() {
        let out = clean_list(vec![
            " Астана ".into(),
            "".into(),
            "алматы".into(),
            "АЛМАТЫ".into(),
        ]);
        assert_eq!(out, vec!["алматы".to_string(), "астана".to_string()]);
    }

    #[test]
    fn keywords_file_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("keywords.toml");
        std::fs::write(&p, r#"keywords = ["Шымкент", "актау", "актау"]"#).unwrap();
        let out = load_keywords_from(&p).unwrap();
        assert_eq!(out, vec!["актау".to_string(), "шымкент".to_string()]);
    }

    #[test]
    fn empty_keywords_file_is_a_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("keywords.toml");
        std::fs::write(&p, r#"keywords = ["  ", ""]"#).unwrap();
        assert!(load_keywords_from(&p).is_err());
    }

    #[test]
    fn default_keywords_are_lowercase() {
        for k in default_keywords() {
            assert_eq!(k, k.to_lowercase());
        }
    }
}
