use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::params::{DisplayParams, GenerationParams};

/// Session identifier (UUID v4, hyphenated lowercase)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Accept only well-formed UUIDs so ids are safe to use as directory names
    pub fn parse(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s.trim())
            .ok()
            .map(|u| Self(u.hyphenated().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted form of a session, written as `session.json`.
///
/// The source image and the index buffer live next to it as PNG files;
/// history is never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub generation: GenerationParams,
    #[serde(default)]
    pub display: DisplayParams,
    /// Quantizer output, index to RGB
    #[serde(default)]
    pub base_palette: BTreeMap<u8, [u8; 3]>,
    /// User recolors layered over the base palette
    #[serde(default)]
    pub overrides: BTreeMap<u8, [u8; 3]>,
    /// Bumped whenever a new source image is loaded
    #[serde(default)]
    pub source_revision: u64,
    #[serde(default)]
    pub has_source: bool,
    /// Buffer dimensions, present once a chart was generated
    #[serde(default)]
    pub chart_size: Option<(u32, u32)>,
}
