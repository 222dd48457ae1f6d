use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Category assigned to an extracted technology term.
/// Serde strings are the display names shown to clients, so they double
/// as the wire format for rating records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TechCategory {
    #[serde(rename = "Programming Languages")]
    ProgrammingLanguages,
    #[serde(rename = "Frontend Technologies")]
    Frontend,
    #[serde(rename = "Backend Technologies")]
    Backend,
    #[serde(rename = "Databases")]
    Databases,
    #[serde(rename = "Cloud & DevOps")]
    CloudDevOps,
    #[serde(rename = "Mobile Development")]
    Mobile,
    #[serde(rename = "Data Science & ML")]
    DataScienceML,
    #[serde(rename = "Testing & QA")]
    Testing,
    #[serde(rename = "Developer Tools")]
    DevTools,
    #[serde(rename = "General")]
    General,
}

/// One technology with its category and the user's self-assessed
/// confidence. `confidence_level` is always within 1..=10; extraction
/// seeds it at the midpoint and the user edits it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyEntry {
    pub name: String,
    pub category: TechCategory,
    pub confidence_level: u8,
}

/// Ordered, de-duplicated set of technologies extracted from free text
/// or edited by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnologyProfile {
    pub technologies: Vec<TechnologyEntry>,
}

impl TechnologyProfile {
    pub fn is_empty(&self) -> bool {
        self.technologies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.technologies.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.technologies
            .iter()
            .any(|t| t.name.eq_ignore_ascii_case(name))
    }
}

/// Persisted rating record, one per `(user_id, resume_hash)`.
/// `technologies` holds the serialized `TechnologyProfile`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TechRatingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resume_hash: String,
    pub technologies: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
