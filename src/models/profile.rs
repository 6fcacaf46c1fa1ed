//! Profile model: one record per authenticated caller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Store key of a profile. Wraps the caller's account identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProfileKey(String);

impl ProfileKey {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self(user_id.into())
    }

    pub fn user_id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Profile/{}", self.0)
    }
}

/// T-shirt size a caller can register with.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum TeeShirtSize {
    #[default]
    #[serde(rename = "NOT_SPECIFIED")]
    NotSpecified,
    XS,
    S,
    M,
    L,
    XL,
    XXL,
    XXXL,
}

impl TeeShirtSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeeShirtSize::NotSpecified => "NOT_SPECIFIED",
            TeeShirtSize::XS => "XS",
            TeeShirtSize::S => "S",
            TeeShirtSize::M => "M",
            TeeShirtSize::L => "L",
            TeeShirtSize::XL => "XL",
            TeeShirtSize::XXL => "XXL",
            TeeShirtSize::XXXL => "XXXL",
        }
    }
}

impl FromStr for TeeShirtSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_SPECIFIED" => Ok(TeeShirtSize::NotSpecified),
            "XS" => Ok(TeeShirtSize::XS),
            "S" => Ok(TeeShirtSize::S),
            "M" => Ok(TeeShirtSize::M),
            "L" => Ok(TeeShirtSize::L),
            "XL" => Ok(TeeShirtSize::XL),
            "XXL" => Ok(TeeShirtSize::XXL),
            "XXXL" => Ok(TeeShirtSize::XXXL),
            other => Err(format!("Unknown tee shirt size: {}", other)),
        }
    }
}

/// A caller's profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    pub display_name: String,
    pub main_email: String,
    pub tee_shirt_size: TeeShirtSize,
    /// Websafe keys of the conferences this caller is registered for
    #[serde(default)]
    pub conference_keys_to_attend: Vec<String>,
}

impl Profile {
    pub fn new(
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        main_email: impl Into<String>,
        tee_shirt_size: TeeShirtSize,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            main_email: main_email.into(),
            tee_shirt_size,
            conference_keys_to_attend: Vec::new(),
        }
    }

    pub fn key(&self) -> ProfileKey {
        ProfileKey::new(self.user_id.as_str())
    }

    /// Apply a resubmitted form. Identity and email never change, and an
    /// omitted display name keeps the stored one.
    pub fn update(&mut self, display_name: Option<String>, tee_shirt_size: TeeShirtSize) {
        if let Some(name) = display_name {
            self.display_name = name;
        }
        self.tee_shirt_size = tee_shirt_size;
    }
}

/// Request body for saving the caller's profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub tee_shirt_size: Option<TeeShirtSize>,
}

impl ProfileForm {
    /// Submitted display name, exactly as sent. Blank submissions count as
    /// omitted.
    pub fn display_name(&self) -> Option<String> {
        self.display_name
            .as_ref()
            .filter(|name| !name.trim().is_empty())
            .cloned()
    }
}
