use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// A project: the container for one task forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project with a fresh id and both timestamps set to now
    pub fn new(title: impl Into<String>) -> Self {
        let now = timestamp::now();
        Project {
            id: super::new_id(),
            title: title.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = timestamp::now();
    }
}
