use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::ApiError;
use crate::types::WatchStatus;

// ── User ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub location: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub picture: Option<String>,
}

// ── Anime catalog items ─────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Anime {
    pub id: u32,
    pub title: String,
    pub main_picture: Option<Picture>,
    pub alternative_titles: Option<AlternativeTitles>,
    pub num_episodes: Option<u32>,
    pub status: Option<AiringStatus>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub synopsis: Option<String>,
    pub mean: Option<f32>,
    pub genres: Option<Vec<Genre>>,
    pub start_season: Option<StartSeason>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Picture {
    pub medium: Option<String>,
    pub large: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlternativeTitles {
    pub en: Option<String>,
    pub ja: Option<String>,
    pub synonyms: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartSeason {
    pub year: u32,
    pub season: String,
}

/// MAL's airing-status tokens, accepted in any case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiringStatus {
    FinishedAiring,
    CurrentlyAiring,
    NotYetAired,
}

impl AiringStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FinishedAiring => "finished_airing",
            Self::CurrentlyAiring => "currently_airing",
            Self::NotYetAired => "not_yet_aired",
        }
    }
}

impl FromStr for AiringStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "finished_airing" => Ok(Self::FinishedAiring),
            "currently_airing" => Ok(Self::CurrentlyAiring),
            "not_yet_aired" => Ok(Self::NotYetAired),
            other => Err(ApiError::Parse(format!("unknown airing status '{other}'"))),
        }
    }
}

impl<'de> Deserialize<'de> for AiringStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for AiringStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Search response ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchAnimeResponse {
    pub data: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SearchEntry {
    pub node: Anime,
}

// ── User anime list ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserAnimeList {
    pub data: Vec<UserAnimeListData>,
    pub paging: Paging,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserAnimeListData {
    pub node: Anime,
    pub list_status: ListStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListStatus {
    pub status: Option<WatchStatus>,
    #[serde(default)]
    pub num_episodes_watched: u32,
    #[serde(default)]
    pub is_rewatching: bool,
    pub score: Option<u32>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The opaque pagination cursor: a ready-to-fetch next-page URL, or absent
/// on the last page.
#[derive(Debug, Deserialize)]
pub struct Paging {
    pub next: Option<String>,
}

// ── Status update ───────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAnimeStatusResponse {
    pub status: Option<WatchStatus>,
    pub score: Option<u32>,
    #[serde(default)]
    pub num_episodes_watched: u32,
    #[serde(default)]
    pub is_rewatching: bool,
    pub updated_at: Option<DateTime<Utc>>,
    pub num_times_rewatched: Option<u32>,
}

/// Sort orders for the user anime list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    ListScore,
    ListUpdatedAt,
    AnimeTitle,
    AnimeStartDate,
    AnimeId,
}

impl Sort {
    /// Lowercase, underscore-separated token for the `sort` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ListScore => "list_score",
            Self::ListUpdatedAt => "list_updated_at",
            Self::AnimeTitle => "anime_title",
            Self::AnimeStartDate => "anime_start_date",
            Self::AnimeId => "anime_id",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_user() {
        let json = r#"{
            "id": 1234567,
            "name": "kakehashi",
            "location": "Tokyo",
            "joined_at": "2018-03-22T11:40:57+00:00",
            "picture": "https://cdn.myanimelist.net/images/userimages/1234567.jpg"
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 1234567);
        assert_eq!(user.name, "kakehashi");
        assert_eq!(user.location.as_deref(), Some("Tokyo"));
        assert_eq!(user.joined_at.to_rfc3339(), "2018-03-22T11:40:57+00:00");
    }

    #[test]
    fn test_deserialize_user_without_optional_fields() {
        let json = r#"{ "id": 1, "name": "x", "joined_at": "2020-01-01T00:00:00+00:00" }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.location.is_none());
        assert!(user.picture.is_none());
    }

    #[test]
    fn test_deserialize_search_response() {
        let json = r#"{
            "data": [
                {
                    "node": {
                        "id": 52991,
                        "title": "Sousou no Frieren",
                        "main_picture": {
                            "medium": "https://cdn.myanimelist.net/images/anime/1015/138006.jpg",
                            "large": "https://cdn.myanimelist.net/images/anime/1015/138006l.jpg"
                        },
                        "num_episodes": 28,
                        "status": "finished_airing",
                        "mean": 9.32,
                        "start_season": {"year": 2023, "season": "fall"}
                    }
                },
                {
                    "node": { "id": 486, "title": "Kino no Tabi" }
                }
            ]
        }"#;

        let resp: SearchAnimeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.data.len(), 2);
        assert_eq!(resp.data[0].node.status, Some(AiringStatus::FinishedAiring));
        assert_eq!(resp.data[0].node.num_episodes, Some(28));
        assert!(resp.data[1].node.main_picture.is_none());
    }

    #[test]
    fn test_airing_status_case_insensitive() {
        for raw in ["finished_airing", "FINISHED_AIRING", "Finished_Airing"] {
            assert_eq!(
                raw.parse::<AiringStatus>().unwrap(),
                AiringStatus::FinishedAiring
            );
        }
        assert!("airing".parse::<AiringStatus>().is_err());
    }

    #[test]
    fn test_deserialize_list_page() {
        let json = r#"{
            "data": [
                {
                    "node": { "id": 52991, "title": "Sousou no Frieren", "num_episodes": 28 },
                    "list_status": {
                        "status": "Watching",
                        "num_episodes_watched": 14,
                        "is_rewatching": false,
                        "updated_at": "2024-01-15T10:00:00+00:00"
                    }
                }
            ],
            "paging": { "next": "https://api.myanimelist.net/v2/users/@me/animelist?offset=100" }
        }"#;

        let page: UserAnimeList = serde_json::from_str(json).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].list_status.status, Some(WatchStatus::Watching));
        assert_eq!(page.data[0].list_status.num_episodes_watched, 14);
        assert!(page.paging.next.is_some());
    }

    #[test]
    fn test_deserialize_last_page_has_no_cursor() {
        let json = r#"{ "data": [], "paging": {} }"#;
        let page: UserAnimeList = serde_json::from_str(json).unwrap();
        assert!(page.data.is_empty());
        assert!(page.paging.next.is_none());
    }

    #[test]
    fn test_deserialize_update_response() {
        let json = r#"{
            "status": "completed",
            "score": 9,
            "num_episodes_watched": 28,
            "is_rewatching": false,
            "updated_at": "2024-03-22T18:00:00+00:00",
            "num_times_rewatched": 1
        }"#;

        let resp: UpdateAnimeStatusResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status, Some(WatchStatus::Completed));
        assert_eq!(resp.num_episodes_watched, 28);
        assert_eq!(resp.num_times_rewatched, Some(1));
    }

    #[test]
    fn test_sort_tokens() {
        assert_eq!(Sort::ListScore.as_str(), "list_score");
        assert_eq!(Sort::ListUpdatedAt.as_str(), "list_updated_at");
        assert_eq!(Sort::AnimeStartDate.as_str(), "anime_start_date");
    }
}
