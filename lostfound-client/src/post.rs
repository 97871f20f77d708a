use chrono::{DateTime, NaiveDate, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::LostFoundError;

/// Stored in `contact_info` by the backend when the viewer is not signed in.
pub const MASKED_CONTACT: &str = "Sign in to view contact information";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[display("lost")]
    Lost,
    #[display("found")]
    Found,
}

impl FromStr for Category {
    type Err = LostFoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lost" => Ok(Category::Lost),
            "found" => Ok(Category::Found),
            other => Err(LostFoundError::InvalidRequest(format!(
                "unknown category '{other}', expected lost or found"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[display("active")]
    Active,
    #[display("resolved")]
    Resolved,
    #[display("closed")]
    Closed,
}

impl FromStr for Status {
    type Err = LostFoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Status::Active),
            "resolved" => Ok(Status::Resolved),
            "closed" => Ok(Status::Closed),
            other => Err(LostFoundError::InvalidRequest(format!(
                "unknown status '{other}', expected active, resolved or closed"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Display)]
#[display("Post {{ id: {}, title: {}, category: {}, status: {} }}", id, title, category, status)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub status: Status,
    pub contact_info: String,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub date_posted: DateTime<Utc>,
    #[serde(default, with = "calendar_date")]
    pub date_lost_found: Option<NaiveDate>,
    pub user_id: Uuid,
    #[serde(default)]
    pub profiles: Option<Profile>,
}

impl Post {
    pub fn is_contact_masked(&self) -> bool {
        self.contact_info == MASKED_CONTACT
    }

    pub fn poster_name(&self) -> Option<&str> {
        self.profiles
            .as_ref()
            .and_then(|p| p.full_name.as_deref())
            .filter(|name| !name.trim().is_empty())
    }

    pub fn is_owned_by(&self, user_id: Option<Uuid>) -> bool {
        user_id == Some(self.user_id)
    }
}

/// Insert payload for the `posts` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPost {
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub location: Option<String>,
    pub contact_info: String,
    pub date_lost_found: Option<NaiveDate>,
    pub image_url: Option<String>,
}

/// `date_lost_found` is a `date` column in some deployments and a
/// `timestamptz` in others. Both decode to the calendar date.
mod calendar_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
            return Ok(None);
        };

        if let Ok(date) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            return Ok(Some(date));
        }
        DateTime::parse_from_rfc3339(raw.trim())
            .map(|dt| Some(dt.date_naive()))
            .map_err(|e| D::Error::custom(format!("invalid date '{raw}': {e}")))
    }
}
