//! The authenticated-call seam every service client goes through.
//!
//! Clients describe a call as provider + verb + URL + optional body; the
//! dispatcher attaches credentials, performs the HTTP exchange, and folds
//! non-success statuses into [`ApiError`]. Tests substitute a recording mock
//! for the reqwest-backed implementation.

use std::future::Future;

use serde::de::DeserializeOwned;

use crate::config::UserConfig;
use crate::error::ApiError;
use crate::provider::Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallVerb {
    Get,
    Post,
    Put,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded` key/value pairs, order preserved.
    Form(Vec<(String, String)>),
    /// A JSON document.
    Json(serde_json::Value),
}

/// A successful HTTP exchange: status is always in the 2xx range.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// Deserialize the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

/// Performs an authenticated call against a provider's API.
pub trait Dispatch: Send + Sync {
    fn dispatch(
        &self,
        provider: Provider,
        verb: CallVerb,
        url: &str,
        body: Option<RequestBody>,
    ) -> impl Future<Output = Result<ApiResponse, ApiError>> + Send;
}

/// Production dispatcher: reqwest client plus the user's stored tokens.
///
/// `&self` only; safe to share across concurrent callers.
pub struct HttpDispatcher {
    http: reqwest::Client,
    config: UserConfig,
}

impl HttpDispatcher {
    pub fn new(config: UserConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

impl Dispatch for HttpDispatcher {
    async fn dispatch(
        &self,
        provider: Provider,
        verb: CallVerb,
        url: &str,
        body: Option<RequestBody>,
    ) -> Result<ApiResponse, ApiError> {
        let token = self.config.auth_token_for(provider).ok_or_else(|| {
            ApiError::Auth(format!("no access token configured for {provider}"))
        })?;

        let mut request = match verb {
            CallVerb::Get => self.http.get(url),
            CallVerb::Post => self.http.post(url),
            CallVerb::Put => self.http.put(url),
        };
        request = request.header("Authorization", format!("Bearer {token}"));
        request = match body {
            Some(RequestBody::Form(pairs)) => request.form(&pairs),
            Some(RequestBody::Json(value)) => request.json(&value),
            None => request,
        };

        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if status.is_success() {
            Ok(ApiResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            tracing::warn!(%provider, status = status.as_u16(), "API call failed");
            Err(ApiError::Api {
                status: status.as_u16(),
                message: body,
            })
        }
    }
}
