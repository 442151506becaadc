use crate::error::{Result, WorkoutError};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";

// ---------------------------------------------------------------------------
// DuplicationConfig
// ---------------------------------------------------------------------------

/// Tuning for the entry duplicator's batch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicationConfig {
    /// Create calls issued concurrently per batch. Never zero.
    pub batch_size: usize,
    /// Pause between two batches when the previous one fully succeeded.
    pub base_delay: Duration,
    /// Pause between two batches when the previous one had a failure.
    pub backoff_delay: Duration,
}

fn default_batch_size() -> usize {
    3
}

fn default_base_delay() -> Duration {
    Duration::from_millis(500)
}

fn default_backoff_delay() -> Duration {
    Duration::from_millis(1500)
}

impl Default for DuplicationConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            base_delay: default_base_delay(),
            backoff_delay: default_backoff_delay(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Process-wide settings, built once at start-up and handed to every
/// component. Nothing below this layer reads the environment.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub template_entries_db_id: String,
    pub entries_db_id: String,
    pub notion_version: String,
    pub base_url: String,
    /// Database receiving interaction log pages. `None` disables logging.
    pub inbox_db_id: Option<String>,
    pub debug: bool,
    pub duplication: DuplicationConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("template_entries_db_id", &self.template_entries_db_id)
            .field("entries_db_id", &self.entries_db_id)
            .field("notion_version", &self.notion_version)
            .field("base_url", &self.base_url)
            .field("inbox_db_id", &self.inbox_db_id)
            .field("debug", &self.debug)
            .field("duplication", &self.duplication)
            .finish()
    }
}

impl Config {
    /// Build from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| get(key).ok_or_else(|| WorkoutError::MissingConfig(key.into()));

        let duplication = DuplicationConfig {
            batch_size: parse_or(
                get("DUPLICATION_BATCH_SIZE"),
                "DUPLICATION_BATCH_SIZE",
                default_batch_size(),
            )?,
            base_delay: parse_millis_or(
                get("DUPLICATION_BASE_DELAY_MS"),
                "DUPLICATION_BASE_DELAY_MS",
                default_base_delay(),
            )?,
            backoff_delay: parse_millis_or(
                get("DUPLICATION_BACKOFF_DELAY_MS"),
                "DUPLICATION_BACKOFF_DELAY_MS",
                default_backoff_delay(),
            )?,
        };
        if duplication.batch_size == 0 {
            return Err(WorkoutError::InvalidConfig {
                key: "DUPLICATION_BATCH_SIZE".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            api_key: require("NOTION_API_KEY")?,
            template_entries_db_id: require("WORKOUT_ENTRY_TEMPLATES_DB_ID")?,
            entries_db_id: require("WORKOUT_ENTRIES_DB_ID")?,
            notion_version: get("NOTION_VERSION").unwrap_or_else(|| DEFAULT_NOTION_VERSION.into()),
            base_url: get("NOTION_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            inbox_db_id: get("NOTION_INBOX_DB_ID"),
            debug: get("DEBUG").is_some_and(|v| parse_flag(&v)),
            duplication,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

fn parse_or(value: Option<String>, key: &str, default: usize) -> Result<usize> {
    match value {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| WorkoutError::InvalidConfig {
            key: key.into(),
            reason: format!("'{v}' is not a non-negative integer"),
        }),
    }
}

fn parse_millis_or(value: Option<String>, key: &str, default: Duration) -> Result<Duration> {
    match value {
        None => Ok(default),
        Some(v) => v
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| WorkoutError::InvalidConfig {
                key: key.into(),
                reason: format!("'{v}' is not a number of milliseconds"),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("NOTION_API_KEY", "secret_abc"),
        ("WORKOUT_ENTRY_TEMPLATES_DB_ID", "tpl-db"),
        ("WORKOUT_ENTRIES_DB_ID", "entries-db"),
    ];

    #[test]
    fn required_values_with_defaults() {
        let config = Config::from_lookup(lookup(REQUIRED)).unwrap();
        assert_eq!(config.api_key, "secret_abc");
        assert_eq!(config.template_entries_db_id, "tpl-db");
        assert_eq!(config.entries_db_id, "entries-db");
        assert_eq!(config.notion_version, DEFAULT_NOTION_VERSION);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.inbox_db_id, None);
        assert!(!config.debug);
        assert_eq!(config.duplication, DuplicationConfig::default());
        assert_eq!(config.duplication.batch_size, 3);
        assert_eq!(config.duplication.base_delay, Duration::from_millis(500));
        assert_eq!(config.duplication.backoff_delay, Duration::from_millis(1500));
    }

    #[test]
    fn missing_api_key_is_reported_by_name() {
        let err = Config::from_lookup(lookup(&REQUIRED[1..])).unwrap_err();
        match err {
            WorkoutError::MissingConfig(key) => assert_eq!(key, "NOTION_API_KEY"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[2] = ("WORKOUT_ENTRIES_DB_ID", "   ");
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, WorkoutError::MissingConfig(k) if k == "WORKOUT_ENTRIES_DB_ID"));
    }

    #[test]
    fn optional_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend_from_slice(&[
            ("DEBUG", "true"),
            ("NOTION_INBOX_DB_ID", "inbox"),
            ("NOTION_BASE_URL", "http://127.0.0.1:9999/"),
            ("DUPLICATION_BATCH_SIZE", "5"),
            ("DUPLICATION_BASE_DELAY_MS", "10"),
            ("DUPLICATION_BACKOFF_DELAY_MS", "20"),
        ]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert!(config.debug);
        assert_eq!(config.inbox_db_id.as_deref(), Some("inbox"));
        assert_eq!(config.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.duplication.batch_size, 5);
        assert_eq!(config.duplication.base_delay, Duration::from_millis(10));
        assert_eq!(config.duplication.backoff_delay, Duration::from_millis(20));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DUPLICATION_BATCH_SIZE", "0"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, WorkoutError::InvalidConfig { .. }));
    }

    #[test]
    fn unparsable_delay_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DUPLICATION_BASE_DELAY_MS", "soon"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("DUPLICATION_BASE_DELAY_MS"));
    }

    #[test]
    fn debug_flag_variants() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("nope"));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = Config::from_lookup(lookup(REQUIRED)).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret_abc"));
        assert!(rendered.contains("<redacted>"));
    }
}
