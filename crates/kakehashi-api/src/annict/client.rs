use crate::dispatch::Dispatch;
use crate::error::ApiError;
use crate::graphql::{self, GraphQlResponse};
use crate::provider::Provider;
use crate::types::WatchStatus;

use super::types::{
    map_status_to_annict, AnnictViewer, AnnictWork, SearchWorksResponse, ViewerResponse,
};

const VIEWER_QUERY: &str = r#"
query {
    viewer {
        id
        username
        name
    }
}
"#;

const SEARCH_WORKS_QUERY: &str = r#"
query ($titles: [String!]) {
    searchWorks(titles: $titles, first: 10) {
        nodes {
            annictId
            title
            episodesCount
            seasonName
            seasonYear
        }
    }
}
"#;

const GET_WORK_QUERY: &str = r#"
query ($annictIds: [Int!]) {
    searchWorks(annictIds: $annictIds, first: 1) {
        nodes {
            annictId
            title
            episodesCount
            seasonName
            seasonYear
        }
    }
}
"#;

const UPDATE_STATUS_MUTATION: &str = r#"
mutation ($workId: Int!, $state: StatusState!) {
    updateStatus(input: { workId: $workId, state: $state }) {
        clientMutationId
    }
}
"#;

/// Annict GraphQL client.
///
/// Annict keys works by `annictId` and tracks only a watch state per work,
/// so the status update carries no episode progress.
pub struct AnnictClient<D: Dispatch> {
    dispatcher: D,
}

impl<D: Dispatch> AnnictClient<D> {
    pub fn new(dispatcher: D) -> Self {
        Self { dispatcher }
    }

    /// Fetch the authenticated user.
    pub async fn get_current_user(&self) -> Option<AnnictViewer> {
        match self
            .request::<ViewerResponse>(VIEWER_QUERY, serde_json::json!({}))
            .await
        {
            Ok(resp) => Some(resp.viewer),
            Err(e) => {
                tracing::error!(error = %e, "Annict viewer lookup failed");
                None
            }
        }
    }

    /// Search Annict works by title.
    pub async fn search_anime(&self, query: &str) -> Option<Vec<AnnictWork>> {
        tracing::info!(query, "Annict work search");
        match self
            .request::<SearchWorksResponse>(
                SEARCH_WORKS_QUERY,
                serde_json::json!({ "titles": [query] }),
            )
            .await
        {
            Ok(resp) => Some(resp.search_works.nodes),
            Err(e) => {
                tracing::error!(error = %e, "Annict work search failed");
                None
            }
        }
    }

    /// Fetch a single work by its Annict id.
    pub async fn get_anime(&self, annict_id: u32) -> Option<AnnictWork> {
        match self
            .request::<SearchWorksResponse>(
                GET_WORK_QUERY,
                serde_json::json!({ "annictIds": [annict_id] }),
            )
            .await
        {
            Ok(resp) => resp.search_works.nodes.into_iter().next(),
            Err(e) => {
                tracing::error!(annict_id, error = %e, "Annict work lookup failed");
                None
            }
        }
    }

    /// Set the user's watch state for a work. Returns whether the mutation
    /// went through.
    pub async fn update_anime_status(&self, work_id: u32, status: WatchStatus) -> bool {
        let state = map_status_to_annict(status);
        tracing::info!(work_id, state, "Annict status update");
        match self
            .request::<serde_json::Value>(
                UPDATE_STATUS_MUTATION,
                serde_json::json!({ "workId": work_id, "state": state }),
            )
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(work_id, error = %e, "Annict status update failed");
                false
            }
        }
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ApiError> {
        let resp =
            graphql::authenticated_request(&self.dispatcher, Provider::Annict, query, variables)
                .await?;
        let envelope: GraphQlResponse<T> = resp.json()?;
        Ok(envelope.data)
    }
}
