//! Types shared by every service client.
//!
//! Watch status is the crate's lingua franca: list entries deserialize into
//! it and the GraphQL clients map it onto their service-specific enums.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

/// The user's watch state for an anime, named as MAL names it.
///
/// Remote APIs send these as strings in varying case; parsing is
/// case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchStatus {
    Watching,
    Completed,
    OnHold,
    Dropped,
    PlanToWatch,
}

impl WatchStatus {
    pub const ALL: &[WatchStatus] = &[
        Self::Watching,
        Self::Completed,
        Self::OnHold,
        Self::Dropped,
        Self::PlanToWatch,
    ];

    /// Lowercase token used in query parameters and form bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Watching => "watching",
            Self::Completed => "completed",
            Self::OnHold => "on_hold",
            Self::Dropped => "dropped",
            Self::PlanToWatch => "plan_to_watch",
        }
    }
}

impl FromStr for WatchStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "watching" => Ok(Self::Watching),
            "completed" => Ok(Self::Completed),
            "on_hold" => Ok(Self::OnHold),
            "dropped" => Ok(Self::Dropped),
            "plan_to_watch" => Ok(Self::PlanToWatch),
            other => Err(ApiError::Parse(format!("unknown watch status '{other}'"))),
        }
    }
}

impl<'de> Deserialize<'de> for WatchStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields for a list-status write.
///
/// The episode count and rewatching flag are always sent; everything else
/// only when present.
#[derive(Debug, Clone, Default)]
pub struct AnimeStatusUpdate {
    pub num_watched_episodes: u32,
    pub status: Option<WatchStatus>,
    pub is_rewatching: Option<bool>,
    pub num_times_rewatched: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub finish_date: Option<NaiveDate>,
}
