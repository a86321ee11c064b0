use std::time::Duration;

use crate::dispatch::{CallVerb, Dispatch, RequestBody};
use crate::error::ApiError;
use crate::provider::Provider;
use crate::sanitize::sanitize_query;
use crate::types::{AnimeStatusUpdate, WatchStatus};
use crate::url_builder::UrlBuilder;

use super::types::{
    Anime, SearchAnimeResponse, Sort, UpdateAnimeStatusResponse, User, UserAnimeList,
    UserAnimeListData,
};

const BASE_URL: &str = "https://api.myanimelist.net/v2";

/// Fields always requested from the user list endpoint.
const LIST_FIELDS: &str = "list_status,num_episodes";

/// Pause between successive list pages; MAL rate-limits aggressive paging.
const PAGE_FETCH_DELAY: Duration = Duration::from_secs(2);

/// MyAnimeList API v2 client.
///
/// Every operation builds a URL, goes through the dispatcher, and parses
/// the JSON body. Failures never propagate: they are logged and returned
/// as `None` or an empty list.
pub struct MalClient<D: Dispatch> {
    dispatcher: D,
}

impl<D: Dispatch> MalClient<D> {
    pub fn new(dispatcher: D) -> Self {
        Self { dispatcher }
    }

    /// Fetch the authenticated user's profile.
    pub async fn get_user_information(&self) -> Option<User> {
        let url = UrlBuilder::new(format!("{BASE_URL}/users/@me")).build();
        match self.get_json(&url).await {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::error!(error = %e, "MAL user lookup failed");
                None
            }
        }
    }

    /// Search the MAL catalog by title.
    ///
    /// The query is whitespace-stripped and truncated to the API's 64
    /// character limit before it goes on the wire.
    pub async fn search_anime(
        &self,
        query: &str,
        fields: Option<&[&str]>,
        include_nsfw: bool,
    ) -> Option<Vec<Anime>> {
        let mut url = UrlBuilder::new(format!("{BASE_URL}/anime"))
            .param("q", sanitize_query(query));
        if include_nsfw {
            url = url.param("nsfw", "true");
        }
        if let Some(fields) = fields {
            url = url.param("fields", fields.join(","));
        }

        let built = url.build();
        tracing::info!(url = %built, "MAL anime search");
        match self.get_json::<SearchAnimeResponse>(&built).await {
            Ok(resp) => Some(resp.data.into_iter().map(|entry| entry.node).collect()),
            Err(e) => {
                tracing::error!(error = %e, "MAL anime search failed");
                None
            }
        }
    }

    /// Fetch a single anime by id.
    pub async fn get_anime(&self, anime_id: u32, fields: Option<&[&str]>) -> Option<Anime> {
        let mut url = UrlBuilder::new(format!("{BASE_URL}/anime/{anime_id}"));
        if let Some(fields) = fields {
            url = url.param("fields", fields.join(","));
        }

        let built = url.build();
        tracing::info!(url = %built, "MAL anime lookup");
        match self.get_json(&built).await {
            Ok(anime) => Some(anime),
            Err(e) => {
                tracing::error!(anime_id, error = %e, "MAL anime lookup failed");
                None
            }
        }
    }

    /// Fetch the authenticated user's anime list.
    ///
    /// Follows the next-page cursor until the list is exhausted, pausing
    /// between pages. With `id_search`, pagination stops at the first page
    /// containing that anime and only the matching entry is returned; when
    /// no page matches, the result is empty (a miss is not an error).
    /// A failure mid-pagination returns whatever was accumulated so far.
    pub async fn get_user_anime_list(
        &self,
        status: Option<WatchStatus>,
        sort: Option<Sort>,
        id_search: Option<u32>,
    ) -> Vec<UserAnimeListData> {
        let mut builder = UrlBuilder::new(format!("{BASE_URL}/users/@me/animelist"))
            .param("fields", LIST_FIELDS);
        if let Some(status) = status {
            builder = builder.param("status", status.as_str());
        }
        if let Some(sort) = sort {
            builder = builder.param("sort", sort.as_str());
        }

        let mut url = builder.build();
        let mut entries = Vec::new();
        loop {
            tracing::info!(url = %url, "MAL user anime list page");
            let page: UserAnimeList = match self.get_json(&url).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(error = %e, "MAL user anime list fetch failed");
                    break;
                }
            };

            let UserAnimeList { data, paging } = page;
            if data.is_empty() {
                break;
            }

            if let Some(id) = id_search {
                if let Some(found) = data.into_iter().find(|entry| entry.node.id == id) {
                    tracing::info!(anime_id = id, "found anime in user list");
                    return vec![found];
                }
            } else {
                entries.extend(data);
            }

            match paging.next {
                Some(next) => {
                    url = next;
                    tracing::info!("additional list page found; pausing before next fetch");
                    tokio::time::sleep(PAGE_FETCH_DELAY).await;
                }
                None => break,
            }
        }

        tracing::info!(entries = entries.len(), "MAL user anime list complete");
        entries
    }

    /// Write the user's list status for an anime.
    ///
    /// The episode count and rewatching flag are always sent; status,
    /// rewatch count, and dates only when present in the update.
    pub async fn update_anime_status(
        &self,
        anime_id: u32,
        update: &AnimeStatusUpdate,
    ) -> Option<UpdateAnimeStatusResponse> {
        let url = UrlBuilder::new(format!("{BASE_URL}/anime/{anime_id}/my_list_status")).build();

        let mut body: Vec<(String, String)> = vec![(
            "num_watched_episodes".into(),
            update.num_watched_episodes.to_string(),
        )];
        if let Some(status) = update.status {
            body.push(("status".into(), status.as_str().into()));
        }
        body.push((
            "is_rewatching".into(),
            if update.is_rewatching.unwrap_or(false) {
                "true"
            } else {
                "false"
            }
            .into(),
        ));
        if let Some(count) = update.num_times_rewatched {
            body.push(("num_times_rewatched".into(), count.to_string()));
        }
        if let Some(date) = update.start_date {
            body.push(("start_date".into(), date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = update.finish_date {
            body.push(("finish_date".into(), date.format("%Y-%m-%d").to_string()));
        }

        tracing::info!(url = %url, "MAL anime status update");
        let result = self
            .dispatcher
            .dispatch(
                Provider::Mal,
                CallVerb::Put,
                &url,
                Some(RequestBody::Form(body)),
            )
            .await
            .and_then(|resp| resp.json());
        match result {
            Ok(resp) => {
                tracing::info!(anime_id, "MAL anime status update complete");
                Some(resp)
            }
            Err(e) => {
                tracing::error!(anime_id, error = %e, "MAL anime status update failed");
                None
            }
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let resp = self
            .dispatcher
            .dispatch(Provider::Mal, CallVerb::Get, url, None)
            .await?;
        resp.json()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::dispatch::testing::MockDispatcher;
    use crate::sanitize::MAX_QUERY_LENGTH;

    use super::*;

    fn query_param(url: &str, key: &str) -> Option<String> {
        let parsed = url::Url::parse(url).unwrap();
        parsed
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    fn form_value(body: &Option<RequestBody>, key: &str) -> Option<String> {
        let Some(RequestBody::Form(pairs)) = body else {
            panic!("expected a form body");
        };
        pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    fn list_page(ids: &[u32], next: Option<&str>) -> String {
        let data: Vec<String> = ids
            .iter()
            .map(|id| {
                format!(
                    r#"{{
                        "node": {{ "id": {id}, "title": "anime {id}", "num_episodes": 12 }},
                        "list_status": {{ "status": "watching", "num_episodes_watched": 3 }}
                    }}"#
                )
            })
            .collect();
        let paging = match next {
            Some(url) => format!(r#"{{ "next": "{url}" }}"#),
            None => "{}".to_string(),
        };
        format!(
            r#"{{ "data": [{}], "paging": {} }}"#,
            data.join(","),
            paging
        )
    }

    #[tokio::test]
    async fn test_get_user_information() {
        let mock = MockDispatcher::ok(&[
            r#"{ "id": 42, "name": "ami", "joined_at": "2019-06-01T00:00:00+00:00" }"#,
        ]);
        let client = MalClient::new(mock);

        let user = client.get_user_information().await.unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.name, "ami");

        let calls = client.dispatcher.calls();
        assert_eq!(calls[0].url, "https://api.myanimelist.net/v2/users/@me");
        assert_eq!(calls[0].verb, CallVerb::Get);
        assert_eq!(calls[0].provider, Provider::Mal);
    }

    #[tokio::test]
    async fn test_get_user_information_failure_is_none() {
        let client = MalClient::new(MockDispatcher::failing(401, "invalid token"));
        assert!(client.get_user_information().await.is_none());
    }

    #[tokio::test]
    async fn test_search_query_is_sanitized_and_truncated() {
        let mock = MockDispatcher::ok(&[r#"{ "data": [] }"#]);
        let client = MalClient::new(mock);

        let long_query = "x".repeat(100);
        let result = client
            .search_anime(&long_query, Some(&["id", "title"]), false)
            .await;
        assert_eq!(result.unwrap().len(), 0);

        let calls = client.dispatcher.calls();
        let q = query_param(&calls[0].url, "q").unwrap();
        assert_eq!(q.len(), MAX_QUERY_LENGTH);
        assert_eq!(q, long_query[..MAX_QUERY_LENGTH]);
        assert_eq!(
            query_param(&calls[0].url, "fields").as_deref(),
            Some("id,title")
        );
        assert!(query_param(&calls[0].url, "nsfw").is_none());
    }

    #[tokio::test]
    async fn test_search_nsfw_flag_appended_when_requested() {
        let mock = MockDispatcher::ok(&[r#"{ "data": [] }"#]);
        let client = MalClient::new(mock);

        let _ = client.search_anime("frieren", None, true).await;
        let calls = client.dispatcher.calls();
        assert_eq!(query_param(&calls[0].url, "nsfw").as_deref(), Some("true"));
        assert!(query_param(&calls[0].url, "fields").is_none());
    }

    #[tokio::test]
    async fn test_search_failure_is_none() {
        let client = MalClient::new(MockDispatcher::failing(500, "oops"));
        assert!(client.search_anime("frieren", None, false).await.is_none());
    }

    #[tokio::test]
    async fn test_get_anime_by_id() {
        let mock = MockDispatcher::ok(&[r#"{ "id": 52991, "title": "Sousou no Frieren" }"#]);
        let client = MalClient::new(mock);

        let anime = client.get_anime(52991, Some(&["id", "title"])).await.unwrap();
        assert_eq!(anime.id, 52991);

        let calls = client.dispatcher.calls();
        assert!(calls[0]
            .url
            .starts_with("https://api.myanimelist.net/v2/anime/52991?fields="));
    }

    #[tokio::test]
    async fn test_get_anime_parse_failure_is_none() {
        let client = MalClient::new(MockDispatcher::ok(&["not json"]));
        assert!(client.get_anime(1, None).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_pagination_accumulates_all_pages() {
        let page2_url = "https://api.myanimelist.net/v2/users/@me/animelist?offset=2";
        let page3_url = "https://api.myanimelist.net/v2/users/@me/animelist?offset=4";
        let mock = MockDispatcher::ok(&[
            &list_page(&[1, 2], Some(page2_url)),
            &list_page(&[3, 4], Some(page3_url)),
            &list_page(&[5], None),
        ]);
        let client = MalClient::new(mock);

        let entries = client
            .get_user_anime_list(Some(WatchStatus::Watching), Some(Sort::ListUpdatedAt), None)
            .await;
        let ids: Vec<u32> = entries.iter().map(|e| e.node.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let calls = client.dispatcher.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            query_param(&calls[0].url, "fields").as_deref(),
            Some("list_status,num_episodes")
        );
        assert_eq!(
            query_param(&calls[0].url, "status").as_deref(),
            Some("watching")
        );
        assert_eq!(
            query_param(&calls[0].url, "sort").as_deref(),
            Some("list_updated_at")
        );
        // Subsequent fetches follow the cursor verbatim.
        assert_eq!(calls[1].url, page2_url);
        assert_eq!(calls[2].url, page3_url);
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_id_search_short_circuits() {
        let page2_url = "https://api.myanimelist.net/v2/users/@me/animelist?offset=2";
        let page3_url = "https://api.myanimelist.net/v2/users/@me/animelist?offset=4";
        let mock = MockDispatcher::ok(&[
            &list_page(&[1, 2], Some(page2_url)),
            &list_page(&[3, 4], Some(page3_url)),
            &list_page(&[5], None),
        ]);
        let client = MalClient::new(mock);

        let entries = client.get_user_anime_list(None, None, Some(4)).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].node.id, 4);
        // The match on page 2 stops pagination; page 3 is never fetched.
        assert_eq!(client.dispatcher.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_id_search_miss_is_empty() {
        let page2_url = "https://api.myanimelist.net/v2/users/@me/animelist?offset=2";
        let mock = MockDispatcher::ok(&[
            &list_page(&[1, 2], Some(page2_url)),
            &list_page(&[3], None),
        ]);
        let client = MalClient::new(mock);

        let entries = client.get_user_anime_list(None, None, Some(99)).await;
        assert!(entries.is_empty());
        assert_eq!(client.dispatcher.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_failure_mid_pagination_keeps_accumulated() {
        let page2_url = "https://api.myanimelist.net/v2/users/@me/animelist?offset=2";
        let mock = MockDispatcher::new(vec![
            Ok(crate::dispatch::ApiResponse {
                status: 200,
                body: list_page(&[1, 2], Some(page2_url)),
            }),
            Err(ApiError::Api {
                status: 503,
                message: "unavailable".into(),
            }),
        ]);
        let client = MalClient::new(mock);

        let entries = client.get_user_anime_list(None, None, None).await;
        let ids: Vec<u32> = entries.iter().map(|e| e.node.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_list_failure_on_first_page_is_empty() {
        let client = MalClient::new(MockDispatcher::failing(500, "oops"));
        assert!(client.get_user_anime_list(None, None, None).await.is_empty());
    }

    #[tokio::test]
    async fn test_update_sends_required_fields_and_defaults() {
        let mock = MockDispatcher::ok(&[r#"{ "num_episodes_watched": 5 }"#]);
        let client = MalClient::new(mock);

        let update = AnimeStatusUpdate {
            num_watched_episodes: 5,
            ..Default::default()
        };
        let resp = client.update_anime_status(52991, &update).await.unwrap();
        assert_eq!(resp.num_episodes_watched, 5);

        let calls = client.dispatcher.calls();
        assert_eq!(calls[0].verb, CallVerb::Put);
        assert_eq!(
            calls[0].url,
            "https://api.myanimelist.net/v2/anime/52991/my_list_status"
        );
        assert_eq!(
            form_value(&calls[0].body, "num_watched_episodes").as_deref(),
            Some("5")
        );
        // Unset rewatching flag still goes out, as false.
        assert_eq!(
            form_value(&calls[0].body, "is_rewatching").as_deref(),
            Some("false")
        );
        assert!(form_value(&calls[0].body, "status").is_none());
        assert!(form_value(&calls[0].body, "num_times_rewatched").is_none());
        assert!(form_value(&calls[0].body, "start_date").is_none());
        assert!(form_value(&calls[0].body, "finish_date").is_none());
    }

    #[tokio::test]
    async fn test_update_sends_optional_fields_when_present() {
        let mock = MockDispatcher::ok(&[r#"{ "status": "completed" }"#]);
        let client = MalClient::new(mock);

        let update = AnimeStatusUpdate {
            num_watched_episodes: 28,
            status: Some(WatchStatus::Completed),
            is_rewatching: Some(true),
            num_times_rewatched: Some(2),
            start_date: NaiveDate::from_ymd_opt(2023, 9, 29),
            finish_date: NaiveDate::from_ymd_opt(2024, 3, 22),
        };
        client.update_anime_status(52991, &update).await.unwrap();

        let calls = client.dispatcher.calls();
        assert_eq!(
            form_value(&calls[0].body, "status").as_deref(),
            Some("completed")
        );
        assert_eq!(
            form_value(&calls[0].body, "is_rewatching").as_deref(),
            Some("true")
        );
        assert_eq!(
            form_value(&calls[0].body, "num_times_rewatched").as_deref(),
            Some("2")
        );
        assert_eq!(
            form_value(&calls[0].body, "start_date").as_deref(),
            Some("2023-09-29")
        );
        assert_eq!(
            form_value(&calls[0].body, "finish_date").as_deref(),
            Some("2024-03-22")
        );
    }

    #[tokio::test]
    async fn test_update_failure_is_none() {
        let client = MalClient::new(MockDispatcher::failing(400, "bad request"));
        let update = AnimeStatusUpdate::default();
        assert!(client.update_anime_status(1, &update).await.is_none());
    }
}
