use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::types::WatchStatus;

// ── Viewer ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ViewerResponse {
    #[serde(rename = "Viewer")]
    pub viewer: AniListViewer,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AniListViewer {
    pub id: u64,
    pub name: String,
}

// ── Media ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PageResponse {
    #[serde(rename = "Page")]
    pub page: PageData,
}

#[derive(Debug, Deserialize)]
pub struct PageData {
    pub media: Vec<AniListMedia>,
}

#[derive(Debug, Deserialize)]
pub struct MediaResponse {
    #[serde(rename = "Media")]
    pub media: AniListMedia,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AniListMedia {
    pub id: u64,
    pub title: Option<AniListTitle>,
    pub episodes: Option<u32>,
    #[serde(rename = "coverImage")]
    pub cover_image: Option<CoverImage>,
    #[serde(rename = "meanScore")]
    pub mean_score: Option<u32>,
    pub status: Option<String>,
    pub season: Option<String>,
    #[serde(rename = "seasonYear")]
    pub season_year: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AniListTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoverImage {
    pub large: Option<String>,
}

// ── User list ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MediaListCollectionResponse {
    #[serde(rename = "MediaListCollection")]
    pub media_list_collection: MediaListCollection,
}

#[derive(Debug, Deserialize)]
pub struct MediaListCollection {
    #[serde(rename = "hasNextChunk", default)]
    pub has_next_chunk: bool,
    pub lists: Vec<MediaListGroup>,
}

#[derive(Debug, Deserialize)]
pub struct MediaListGroup {
    pub entries: Vec<AniListListEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AniListListEntry {
    #[serde(rename = "mediaId")]
    pub media_id: u64,
    #[serde(default)]
    pub progress: u32,
    pub status: Option<String>,
    #[serde(default)]
    pub repeat: u32,
    pub media: AniListMedia,
}

// ── Mutations ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SaveMediaListEntryResponse {
    #[serde(rename = "SaveMediaListEntry")]
    pub save_media_list_entry: AniListMediaListEntry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AniListMediaListEntry {
    pub id: u64,
    pub progress: Option<u32>,
    pub status: Option<String>,
}

/// AniList's `MediaListStatus` value for a watch status.
pub fn map_status_to_anilist(status: WatchStatus) -> &'static str {
    match status {
        WatchStatus::Watching => "CURRENT",
        WatchStatus::Completed => "COMPLETED",
        WatchStatus::OnHold => "PAUSED",
        WatchStatus::Dropped => "DROPPED",
        WatchStatus::PlanToWatch => "PLANNING",
    }
}

/// A calendar date as AniList's `FuzzyDateInput` object.
pub fn fuzzy_date_input(date: NaiveDate) -> serde_json::Value {
    serde_json::json!({
        "year": date.year(),
        "month": date.month(),
        "day": date.day(),
    })
}
