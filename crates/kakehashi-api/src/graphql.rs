//! GraphQL call plumbing shared by the AniList and Annict clients.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::dispatch::{ApiResponse, CallVerb, Dispatch, RequestBody};
use crate::error::ApiError;
use crate::provider::Provider;

/// The POST body every GraphQL endpoint expects.
#[derive(Debug, Serialize)]
pub struct GraphQlBody<'a> {
    pub query: &'a str,
    pub variables: &'a serde_json::Value,
}

/// The `{"data": ...}` envelope GraphQL responses arrive in.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: T,
}

/// Send an authenticated GraphQL query through the dispatcher.
///
/// The endpoint comes from [`Provider::graphql_endpoint`]; a provider
/// without one is a configuration error, reported immediately rather than
/// producing a malformed request.
pub async fn authenticated_request<D: Dispatch>(
    dispatcher: &D,
    provider: Provider,
    query: &str,
    variables: serde_json::Value,
) -> Result<ApiResponse, ApiError> {
    let endpoint = provider
        .graphql_endpoint()
        .ok_or(ApiError::NoGraphQlEndpoint(provider))?;

    let body = serde_json::to_value(GraphQlBody {
        query,
        variables: &variables,
    })
    .map_err(|e| ApiError::Parse(e.to_string()))?;

    dispatcher
        .dispatch(provider, CallVerb::Post, endpoint, Some(RequestBody::Json(body)))
        .await
}

/// Send an unauthenticated GraphQL query and deserialize the response.
///
/// For public queries that need no user token. Resolves the endpoint
/// through the same provider lookup as the authenticated path.
pub async fn deserialize_request<T: DeserializeOwned>(
    http: &reqwest::Client,
    provider: Provider,
    query: &str,
    variables: serde_json::Value,
) -> Result<T, ApiError> {
    let endpoint = provider
        .graphql_endpoint()
        .ok_or(ApiError::NoGraphQlEndpoint(provider))?;

    tracing::debug!(%provider, "unauthenticated GraphQL request");
    let resp = http
        .post(endpoint)
        .header("Accept", "application/json")
        .json(&GraphQlBody {
            query,
            variables: &variables,
        })
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        tracing::warn!(%provider, status = status.as_u16(), "GraphQL API error");
        return Err(ApiError::Api {
            status: status.as_u16(),
            message,
        });
    }

    resp.json::<T>()
        .await
        .map_err(|e| ApiError::Parse(e.to_string()))
}
