use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::AppError;

/// User feedback on a suggestion or video.
///
/// Absence of feedback is represented by the record not existing at all,
/// never by a null tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Like,
    Dislike,
}

impl Feedback {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feedback::Like => "like",
            Feedback::Dislike => "dislike",
        }
    }
}

impl Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Feedback {
    type Error = AppError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "like" => Ok(Feedback::Like),
            "dislike" => Ok(Feedback::Dislike),
            other => Err(AppError::Internal(format!(
                "Unknown feedback tag in store: {}",
                other
            ))),
        }
    }
}

/// Which keyed collection a feedback mutation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Query,
    Video,
}

/// A video descriptor returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub video_id: String,
    pub title: String,
    pub url: String,
}

/// Optional descriptive metadata carried alongside a feedback mutation.
///
/// The store never rejects a write for lacking metadata; unknown fields
/// default to empty strings.
#[derive(Debug, Clone, Default)]
pub struct ItemMetadata {
    pub title: String,
    pub url: String,
}

/// A liked item as surfaced to the client, tagged by collection.
///
/// Serializes to `{"type": "video", ...}` / `{"type": "query", ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LikedItem {
    Video {
        video_id: String,
        title: String,
        url: String,
    },
    Query {
        query: String,
    },
}

/// Stored row in the `queries` collection
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRecord {
    pub query: String,
    pub feedback: Feedback,
    pub created_at: DateTime<Utc>,
}

/// Stored row in the `videos` collection
#[derive(Debug, Clone, PartialEq)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
    pub url: String,
    pub feedback: Feedback,
    pub created_at: DateTime<Utc>,
}
