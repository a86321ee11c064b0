use std::time::Duration;

use crate::dispatch::Dispatch;
use crate::error::ApiError;
use crate::graphql::{self, GraphQlResponse};
use crate::provider::Provider;
use crate::types::AnimeStatusUpdate;

use super::types::{
    fuzzy_date_input, map_status_to_anilist, AniListListEntry, AniListMedia,
    AniListMediaListEntry, AniListViewer, MediaListCollectionResponse, MediaResponse,
    PageResponse, SaveMediaListEntryResponse, ViewerResponse,
};

/// Pause between successive list chunks, mirroring the REST client's
/// pagination delay.
const CHUNK_FETCH_DELAY: Duration = Duration::from_secs(2);

const VIEWER_QUERY: &str = r#"
query {
    Viewer {
        id
        name
    }
}
"#;

const SEARCH_QUERY: &str = r#"
query ($search: String) {
    Page(perPage: 10) {
        media(search: $search, type: ANIME) {
            id
            title { romaji english native }
            episodes
            coverImage { large }
            meanScore
            status
            season
            seasonYear
        }
    }
}
"#;

const GET_ANIME_QUERY: &str = r#"
query ($id: Int) {
    Media(id: $id, type: ANIME) {
        id
        title { romaji english native }
        episodes
        coverImage { large }
        meanScore
        status
        season
        seasonYear
    }
}
"#;

const USER_LIST_QUERY: &str = r#"
query ($userId: Int, $chunk: Int) {
    MediaListCollection(userId: $userId, type: ANIME, chunk: $chunk, perChunk: 500) {
        hasNextChunk
        lists {
            entries {
                mediaId
                progress
                status
                repeat
                media {
                    id
                    title { romaji english native }
                    episodes
                    coverImage { large }
                    meanScore
                    status
                    season
                    seasonYear
                }
            }
        }
    }
}
"#;

const SAVE_LIST_ENTRY_MUTATION: &str = r#"
mutation ($mediaId: Int, $progress: Int, $status: MediaListStatus, $repeat: Int,
          $startedAt: FuzzyDateInput, $completedAt: FuzzyDateInput) {
    SaveMediaListEntry(mediaId: $mediaId, progress: $progress, status: $status, repeat: $repeat,
                       startedAt: $startedAt, completedAt: $completedAt) {
        id
        progress
        status
    }
}
"#;

/// AniList GraphQL client.
///
/// Same surface policy as the REST client: failures are logged and folded
/// into absent or empty results.
pub struct AniListClient<D: Dispatch> {
    dispatcher: D,
}

impl<D: Dispatch> AniListClient<D> {
    pub fn new(dispatcher: D) -> Self {
        Self { dispatcher }
    }

    /// Fetch the authenticated user.
    pub async fn get_current_user(&self) -> Option<AniListViewer> {
        match self
            .request::<ViewerResponse>(VIEWER_QUERY, serde_json::json!({}))
            .await
        {
            Ok(resp) => Some(resp.viewer),
            Err(e) => {
                tracing::error!(error = %e, "AniList viewer lookup failed");
                None
            }
        }
    }

    /// Search AniList by title.
    pub async fn search_anime(&self, query: &str) -> Option<Vec<AniListMedia>> {
        tracing::info!(query, "AniList anime search");
        match self
            .request::<PageResponse>(SEARCH_QUERY, serde_json::json!({ "search": query }))
            .await
        {
            Ok(resp) => Some(resp.page.media),
            Err(e) => {
                tracing::error!(error = %e, "AniList anime search failed");
                None
            }
        }
    }

    /// Fetch a single media entry by id.
    pub async fn get_anime(&self, media_id: u64) -> Option<AniListMedia> {
        match self
            .request::<MediaResponse>(GET_ANIME_QUERY, serde_json::json!({ "id": media_id }))
            .await
        {
            Ok(resp) => Some(resp.media),
            Err(e) => {
                tracing::error!(media_id, error = %e, "AniList anime lookup failed");
                None
            }
        }
    }

    /// Fetch the user's full anime list, chunk by chunk.
    ///
    /// Follows `hasNextChunk` with a pause between chunks. A failure mid-way
    /// returns whatever was accumulated so far.
    pub async fn get_current_user_anime_list(&self, user_id: u64) -> Vec<AniListListEntry> {
        let mut entries = Vec::new();
        let mut chunk = 1u32;
        loop {
            tracing::info!(user_id, chunk, "AniList user anime list chunk");
            let resp: MediaListCollectionResponse = match self
                .request(
                    USER_LIST_QUERY,
                    serde_json::json!({ "userId": user_id, "chunk": chunk }),
                )
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    tracing::error!(error = %e, "AniList user anime list fetch failed");
                    break;
                }
            };

            let collection = resp.media_list_collection;
            entries.extend(
                collection
                    .lists
                    .into_iter()
                    .flat_map(|group| group.entries),
            );

            if !collection.has_next_chunk {
                break;
            }
            chunk += 1;
            tracing::info!("additional list chunk found; pausing before next fetch");
            tokio::time::sleep(CHUNK_FETCH_DELAY).await;
        }

        tracing::info!(entries = entries.len(), "AniList user anime list complete");
        entries
    }

    /// Create or update the user's list entry for a media.
    ///
    /// AniList has no rewatching flag; a set `is_rewatching` maps to the
    /// REPEATING list status, overriding any status in the update.
    pub async fn save_media_list_entry(
        &self,
        media_id: u64,
        update: &AnimeStatusUpdate,
    ) -> Option<AniListMediaListEntry> {
        let mut variables = serde_json::json!({
            "mediaId": media_id,
            "progress": update.num_watched_episodes,
        });
        if let Some(status) = update.status {
            variables["status"] = serde_json::json!(map_status_to_anilist(status));
        }
        if update.is_rewatching.unwrap_or(false) {
            variables["status"] = serde_json::json!("REPEATING");
        }
        if let Some(count) = update.num_times_rewatched {
            variables["repeat"] = serde_json::json!(count);
        }
        if let Some(date) = update.start_date {
            variables["startedAt"] = fuzzy_date_input(date);
        }
        if let Some(date) = update.finish_date {
            variables["completedAt"] = fuzzy_date_input(date);
        }

        tracing::info!(media_id, "AniList list entry save");
        match self
            .request::<SaveMediaListEntryResponse>(SAVE_LIST_ENTRY_MUTATION, variables)
            .await
        {
            Ok(resp) => Some(resp.save_media_list_entry),
            Err(e) => {
                tracing::error!(media_id, error = %e, "AniList list entry save failed");
                None
            }
        }
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ApiError> {
        let resp =
            graphql::authenticated_request(&self.dispatcher, Provider::AniList, query, variables)
                .await?;
        let envelope: GraphQlResponse<T> = resp.json()?;
        Ok(envelope.data)
    }
}
