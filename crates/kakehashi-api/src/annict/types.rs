use serde::Deserialize;

use crate::types::WatchStatus;

#[derive(Debug, Deserialize)]
pub struct ViewerResponse {
    pub viewer: AnnictViewer,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnictViewer {
    /// Relay-style global id.
    pub id: String,
    pub username: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchWorksResponse {
    #[serde(rename = "searchWorks")]
    pub search_works: WorkConnection,
}

#[derive(Debug, Deserialize)]
pub struct WorkConnection {
    pub nodes: Vec<AnnictWork>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnictWork {
    #[serde(rename = "annictId")]
    pub annict_id: u32,
    pub title: String,
    #[serde(rename = "episodesCount")]
    pub episodes_count: Option<u32>,
    #[serde(rename = "seasonName")]
    pub season_name: Option<String>,
    #[serde(rename = "seasonYear")]
    pub season_year: Option<u32>,
}

/// Annict's `StatusState` value for a watch status.
pub fn map_status_to_annict(status: WatchStatus) -> &'static str {
    match status {
        WatchStatus::Watching => "WATCHING",
        WatchStatus::Completed => "WATCHED",
        WatchStatus::OnHold => "ON_HOLD",
        WatchStatus::Dropped => "STOP_WATCHING",
        WatchStatus::PlanToWatch => "WANNA_WATCH",
    }
}
