//! reqwest implementation of [`StreamingApi`].

use super::models::{
    ContinueWatching, Credentials, HealthStatus, Identity, Movie, MovieQuery, Profile,
    ProfileDraft, ProfileUpdate, ProgressUpdate, TokenResponse, WatchlistStatus,
};
use super::StreamingApi;
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

/// HTTP client for the StreamFlix API.
pub struct HttpApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpApi {
    /// `base_url` includes the API prefix, e.g. `http://localhost:8001/api`.
    /// `timeout` bounds every request; expiry surfaces as [`ApiError::Timeout`].
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn profile_url(&self, profile_id: &str, rest: &str) -> String {
        self.url(&format!(
            "/profiles/{}{rest}",
            urlencoding::encode(profile_id)
        ))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> ApiResult<reqwest::Response> {
        let resp = request.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "request rejected by server");
        Err(ApiError::Rejected {
            status: status.as_u16(),
            message: error_detail(&body)
                .unwrap_or_else(|| format!("Request failed ({status})")),
        })
    }

    async fn json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> ApiResult<T> {
        let resp = self.send(request).await?;
        resp.json::<T>()
            .await
            .map_err(|e| if e.is_timeout() { ApiError::Timeout } else { ApiError::Decode(e.to_string()) })
    }

    async fn empty(&self, request: reqwest::RequestBuilder) -> ApiResult<()> {
        self.send(request).await.map(|_| ())
    }
}

/// FastAPI puts the human-readable reason in `detail`; fall back to the raw body.
fn error_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => match json.get("detail") {
            Some(serde_json::Value::String(detail)) => Some(detail.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(body.to_string()),
        },
        Err(_) => Some(body.to_string()),
    }
}

#[async_trait]
impl StreamingApi for HttpApi {
    async fn login(&self, credentials: &Credentials) -> ApiResult<TokenResponse> {
        self.json(self.http.post(self.url("/auth/login")).json(credentials))
            .await
    }

    async fn register(&self, credentials: &Credentials) -> ApiResult<TokenResponse> {
        self.json(self.http.post(self.url("/auth/register")).json(credentials))
            .await
    }

    async fn me(&self, token: &str) -> ApiResult<Identity> {
        self.json(self.http.get(self.url("/auth/me")).bearer_auth(token))
            .await
    }

    async fn list_profiles(&self, token: &str) -> ApiResult<Vec<Profile>> {
        self.json(self.http.get(self.url("/profiles")).bearer_auth(token))
            .await
    }

    async fn create_profile(&self, token: &str, draft: &ProfileDraft) -> ApiResult<Profile> {
        self.json(
            self.http
                .post(self.url("/profiles"))
                .bearer_auth(token)
                .json(draft),
        )
        .await
    }

    async fn update_profile(
        &self,
        token: &str,
        profile_id: &str,
        update: &ProfileUpdate,
    ) -> ApiResult<Profile> {
        self.json(
            self.http
                .put(self.profile_url(profile_id, ""))
                .bearer_auth(token)
                .json(update),
        )
        .await
    }

    async fn delete_profile(&self, token: &str, profile_id: &str) -> ApiResult<()> {
        self.empty(
            self.http
                .delete(self.profile_url(profile_id, ""))
                .bearer_auth(token),
        )
        .await
    }

    async fn list_movies(&self, query: &MovieQuery) -> ApiResult<Vec<Movie>> {
        self.json(self.http.get(self.url("/movies")).query(query))
            .await
    }

    async fn get_movie(&self, id_or_slug: &str) -> ApiResult<Movie> {
        let url = self.url(&format!("/movies/{}", urlencoding::encode(id_or_slug)));
        self.json(self.http.get(url)).await
    }

    async fn translations(&self, lang: &str) -> ApiResult<HashMap<String, String>> {
        self.json(
            self.http
                .get(self.url("/translations"))
                .query(&[("lang", lang)]),
        )
        .await
    }

    async fn health(&self) -> ApiResult<HealthStatus> {
        self.json(self.http.get(self.url("/health"))).await
    }

    async fn continue_watching(
        &self,
        token: &str,
        profile_id: &str,
    ) -> ApiResult<Vec<ContinueWatching>> {
        self.json(
            self.http
                .get(self.url("/views/continue"))
                .query(&[("profile_id", profile_id)])
                .bearer_auth(token),
        )
        .await
    }

    async fn update_progress(
        &self,
        token: &str,
        profile_id: &str,
        movie_id: &str,
        update: &ProgressUpdate,
    ) -> ApiResult<()> {
        let url = self.url(&format!("/views/{}", urlencoding::encode(movie_id)));
        self.empty(
            self.http
                .put(url)
                .query(&[("profile_id", profile_id)])
                .bearer_auth(token)
                .json(update),
        )
        .await
    }

    async fn watchlist(&self, token: &str, profile_id: &str) -> ApiResult<Vec<Movie>> {
        self.json(
            self.http
                .get(self.profile_url(profile_id, "/watchlist"))
                .bearer_auth(token),
        )
        .await
    }

    async fn watchlist_contains(
        &self,
        token: &str,
        profile_id: &str,
        movie_id: &str,
    ) -> ApiResult<bool> {
        let rest = format!("/watchlist/check/{}", urlencoding::encode(movie_id));
        let status: WatchlistStatus = self
            .json(
                self.http
                    .get(self.profile_url(profile_id, &rest))
                    .bearer_auth(token),
            )
            .await?;
        Ok(status.in_watchlist)
    }

    async fn add_to_watchlist(
        &self,
        token: &str,
        profile_id: &str,
        movie_id: &str,
    ) -> ApiResult<()> {
        let rest = format!("/watchlist/{}", urlencoding::encode(movie_id));
        self.empty(
            self.http
                .post(self.profile_url(profile_id, &rest))
                .bearer_auth(token),
        )
        .await
    }

    async fn remove_from_watchlist(
        &self,
        token: &str,
        profile_id: &str,
        movie_id: &str,
    ) -> ApiResult<()> {
        let rest = format!("/watchlist/{}", urlencoding::encode(movie_id));
        self.empty(
            self.http
                .delete(self.profile_url(profile_id, &rest))
                .bearer_auth(token),
        )
        .await
    }
}

// ── Tests ────────────────────────────────────────────────────────
