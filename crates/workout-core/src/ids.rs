use crate::error::{Result, WorkoutError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A page identifier in canonical form: separator punctuation stripped.
///
/// The same page may be reported as `1f2e3d4c-...` by one endpoint and
/// `1f2e3d4c...` by another; both normalize to the same `PageId`, so map
/// lookups and equality checks never miss on formatting alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    /// Normalize `raw`. Returns `None` when nothing alphanumeric remains.
    pub fn normalize(raw: &str) -> Option<Self> {
        let canonical: String = raw.chars().filter(|c| c.is_alphanumeric()).collect();
        if canonical.is_empty() {
            None
        } else {
            Some(Self(canonical))
        }
    }

    /// Like [`PageId::normalize`], but an unusable input is an error.
    pub fn parse(raw: &str) -> Result<Self> {
        Self::normalize(raw).ok_or_else(|| WorkoutError::InvalidId(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
