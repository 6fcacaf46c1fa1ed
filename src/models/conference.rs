//! Conference model and its parent-scoped key.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};

use super::ProfileKey;

const CONFERENCE_SEGMENT: &str = "/Conference/";

/// Store key of a conference: an allocated id scoped under the
/// organizer's profile key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConferenceKey {
    pub parent: ProfileKey,
    pub id: i64,
}

impl ConferenceKey {
    pub fn new(parent: ProfileKey, id: i64) -> Self {
        Self { parent, id }
    }
}

/// Websafe form: `Profile/<user id>/Conference/<id>`.
impl fmt::Display for ConferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.parent, CONFERENCE_SEGMENT, self.id)
    }
}

impl Serialize for ConferenceKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A conference owned by the profile that created it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Conference {
    #[serde(rename = "websafeKey")]
    pub key: ConferenceKey,
    pub id: i64,
    pub organizer_user_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub topics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Month of the start date, 0 when no start date was given
    pub month: u32,
    pub max_attendees: i32,
    pub seats_available: i32,
}

impl Conference {
    /// Build a conference from its allocated key and the creation form.
    /// The organizer is always the owner of the parent profile key.
    pub fn new(key: ConferenceKey, form: &ConferenceForm) -> Self {
        Self {
            id: key.id,
            organizer_user_id: key.parent.user_id().to_string(),
            name: form.name.clone(),
            description: form.description.clone(),
            topics: form.topics.clone().unwrap_or_default(),
            city: form.city.clone(),
            start_date: form.start_date,
            end_date: form.end_date,
            month: form.start_date.map(|d| d.month()).unwrap_or(0),
            max_attendees: form.max_attendees,
            seats_available: form.max_attendees,
            key,
        }
    }
}

/// Request body for creating a conference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topics: Option<Vec<String>>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub max_attendees: i32,
}
