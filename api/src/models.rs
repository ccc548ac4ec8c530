//! Shared data models used across modules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::constants::HUMAN_THRESHOLD;

/// Verdict produced by the classifier.
///
/// Index 0 of the model's output is `AI`, index 1 is `Human`. The order is
/// fixed by how the model was trained and must not be swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassLabel {
    #[serde(rename = "AI")]
    Ai,
    #[serde(rename = "Human")]
    Human,
}

impl ClassLabel {
    /// Labels in model output order
    pub const BY_INDEX: [ClassLabel; 2] = [ClassLabel::Ai, ClassLabel::Human];

    /// Threshold a sigmoid score. Rounds half up, so exactly 0.5 is `Human`.
    /// Returns `None` for NaN or infinite scores.
    pub fn from_score(score: f32) -> Option<Self> {
        if !score.is_finite() {
            return None;
        }
        let index = usize::from(score >= HUMAN_THRESHOLD);
        Some(Self::BY_INDEX[index])
    }

    /// Position of this label in the model output
    pub fn index(self) -> usize {
        match self {
            ClassLabel::Ai => 0,
            ClassLabel::Human => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassLabel::Ai => "AI",
            ClassLabel::Human => "Human",
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown class label: {0}")]
pub struct UnknownLabel(pub String);

impl FromStr for ClassLabel {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AI" => Ok(ClassLabel::Ai),
            "Human" => Ok(ClassLabel::Human),
            other => Err(UnknownLabel(other.to_string())),
        }
    }
}

/// Opaque reference to a stored image blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobRef(pub Uuid);

impl BlobRef {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for BlobRef {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// One persisted classification. Never updated once written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionRecord {
    /// Insertion order, newest records have the largest id
    pub id: i64,
    pub blob_ref: BlobRef,
    pub filename: String,
    #[serde(rename = "class")]
    pub label: ClassLabel,
    pub created_at: DateTime<Utc>,
}

/// Record fields supplied by the caller on insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewDetection {
    pub blob_ref: BlobRef,
    pub filename: String,
    pub label: ClassLabel,
}

/// Encoded image bytes plus the metadata stored next to them
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlob {
    pub blob_ref: BlobRef,
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Limit/offset window over the newest-first history.
///
/// A limit of zero or less means no limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListRange {
    pub limit: Option<i64>,
    pub offset: i64,
}

impl ListRange {
    /// Every record
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(limit: Option<i64>, offset: i64) -> Self {
        Self {
            limit: limit.filter(|&l| l > 0),
            offset: offset.max(0),
        }
    }
}
