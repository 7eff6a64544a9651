//! Wire models for the StreamFlix REST API.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ── Accounts ─────────────────────────────────────────────────────

/// Email + password pair sent to `/auth/login` and `/auth/register`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Token pair returned by a successful login or registration.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".into()
}

/// Account role as reported by `/auth/me`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
}

// ── Profiles ─────────────────────────────────────────────────────

/// Maximum profile name length, in characters.
pub const MAX_PROFILE_NAME_CHARS: usize = 20;

/// Fixed avatar palette. Unknown wire values fall back to [`Avatar::Red`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Avatar {
    #[default]
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
    Pink,
    Teal,
}

impl Avatar {
    pub const ALL: [Avatar; 8] = [
        Self::Red,
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Purple,
        Self::Orange,
        Self::Pink,
        Self::Teal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Orange => "orange",
            Self::Pink => "pink",
            Self::Teal => "teal",
        }
    }

    /// Lenient lookup used for wire values: anything unrecognised maps to the default.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.label().eq_ignore_ascii_case(tag))
            .unwrap_or_default()
    }

    /// Terminal colour used when rendering this avatar.
    pub fn color(self) -> console::Color {
        match self {
            Self::Red => console::Color::Red,
            Self::Blue => console::Color::Blue,
            Self::Green => console::Color::Green,
            Self::Yellow => console::Color::Yellow,
            Self::Purple => console::Color::Magenta,
            Self::Orange => console::Color::Color256(208),
            Self::Pink => console::Color::Color256(205),
            Self::Teal => console::Color::Cyan,
        }
    }
}

impl From<String> for Avatar {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl fmt::Display for Avatar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Strict lookup used for user input.
impl FromStr for Avatar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|a| a.label()).collect();
                format!("Unknown avatar '{s}'. Choose one of: {}", names.join(", "))
            })
    }
}

/// Content maturity ceiling for a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaturityRating {
    G,
    #[serde(rename = "PG")]
    Pg,
    #[default]
    #[serde(rename = "PG-13")]
    Pg13,
    R,
    #[serde(rename = "NC-17")]
    Nc17,
}

impl MaturityRating {
    pub const ALL: [MaturityRating; 5] = [Self::G, Self::Pg, Self::Pg13, Self::R, Self::Nc17];

    pub fn label(self) -> &'static str {
        match self {
            Self::G => "G",
            Self::Pg => "PG",
            Self::Pg13 => "PG-13",
            Self::R => "R",
            Self::Nc17 => "NC-17",
        }
    }
}

impl fmt::Display for MaturityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MaturityRating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|r| r.label()).collect();
                format!("Unknown maturity rating '{s}'. Choose one of: {}", names.join(", "))
            })
    }
}

fn default_language() -> String {
    "en".into()
}

/// A viewing profile under one identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Avatar,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub maturity_rating: MaturityRating,
}

/// Body of `POST /profiles`. Built through [`ProfileDraft::new`], which is the
/// only place profile names are validated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileDraft {
    name: String,
    avatar: Avatar,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    maturity_rating: Option<MaturityRating>,
}

impl ProfileDraft {
    pub fn new(name: &str, avatar: Avatar) -> Result<Self, String> {
        Ok(Self {
            name: validate_profile_name(name)?,
            avatar,
            language: None,
            maturity_rating: None,
        })
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_maturity_rating(mut self, rating: MaturityRating) -> Self {
        self.maturity_rating = Some(rating);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn avatar(&self) -> Avatar {
        self.avatar
    }
}

/// Body of `PUT /profiles/{id}`; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Avatar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maturity_rating: Option<MaturityRating>,
}

impl ProfileUpdate {
    pub fn rename(name: &str) -> Result<Self, String> {
        Ok(Self {
            name: Some(validate_profile_name(name)?),
            ..Self::default()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.avatar.is_none()
            && self.language.is_none()
            && self.maturity_rating.is_none()
    }
}

fn validate_profile_name(name: &str) -> Result<String, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Profile name cannot be empty".into());
    }
    if trimmed.chars().count() > MAX_PROFILE_NAME_CHARS {
        return Err(format!(
            "Profile name too long (max {MAX_PROFILE_NAME_CHARS} characters)"
        ));
    }
    Ok(trimmed.to_string())
}

// ── Catalog ──────────────────────────────────────────────────────

/// Catalog genre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovieCategory {
    Action,
    Comedy,
    Drama,
    Horror,
    SciFi,
    Romance,
    Thriller,
    Documentary,
    Animation,
    Family,
}

impl MovieCategory {
    pub const ALL: [MovieCategory; 10] = [
        Self::Action,
        Self::Comedy,
        Self::Drama,
        Self::Horror,
        Self::SciFi,
        Self::Romance,
        Self::Thriller,
        Self::Documentary,
        Self::Animation,
        Self::Family,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::Comedy => "comedy",
            Self::Drama => "drama",
            Self::Horror => "horror",
            Self::SciFi => "sci-fi",
            Self::Romance => "romance",
            Self::Thriller => "thriller",
            Self::Documentary => "documentary",
            Self::Animation => "animation",
            Self::Family => "family",
        }
    }
}

impl fmt::Display for MovieCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MovieCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|c| c.label() == wanted)
            .ok_or_else(|| format!("Unknown category '{s}'"))
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub category: MovieCategory,
    #[serde(default)]
    pub poster_url: String,
    #[serde(default)]
    pub backdrop_url: String,
    #[serde(default)]
    pub video_url: String,
    pub release_year: i32,
    pub rating: f32,
    pub duration_minutes: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    /// language -> field -> translated text
    #[serde(default)]
    pub i18n: HashMap<String, HashMap<String, String>>,
}

impl Movie {
    pub fn localized_title(&self, lang: &str) -> &str {
        self.localized("title", lang).unwrap_or(&self.title)
    }

    pub fn localized_description(&self, lang: &str) -> &str {
        self.localized("description", lang)
            .unwrap_or(&self.description)
    }

    fn localized(&self, field: &str, lang: &str) -> Option<&str> {
        self.i18n
            .get(lang)
            .and_then(|fields| fields.get(field))
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn duration_secs(&self) -> u64 {
        u64::from(self.duration_minutes) * 60
    }
}

/// Filters for `GET /movies`. Serialized as a query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MovieQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<MovieCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

// ── Viewing ──────────────────────────────────────────────────────

/// Stored watch position for one profile and movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewProgress {
    pub id: String,
    pub profile_id: String,
    pub movie_id: String,
    pub progress_seconds: u64,
    #[serde(default)]
    pub completed: bool,
    #[serde(deserialize_with = "wire_time::deserialize")]
    pub last_watched: DateTime<Utc>,
}

/// One row of the "continue watching" shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinueWatching {
    pub movie: Movie,
    pub progress: ViewProgress,
}

/// Body of `PUT /views/{movie_id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub progress_seconds: u64,
    pub completed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WatchlistStatus {
    pub in_watchlist: bool,
}

/// `GET /health` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, deserialize_with = "wire_time::deserialize_option")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Server timestamps arrive either RFC 3339 or naive (no offset). Naive
/// values are UTC.
mod wire_time {
    use super::*;
    use serde::Deserializer;

    pub(super) fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        let raw = raw.trim();
        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Ok(at.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(|naive| naive.and_utc())
            .ok_or_else(|| format!("invalid timestamp '{raw}'"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn deserialize_option<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) => parse(&raw).map(Some).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
