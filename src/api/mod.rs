//! The REST boundary consumed by the session core.
//!
//! [`StreamingApi`] is the seam: [`HttpApi`] talks to the real server, tests
//! swap in a scripted implementation. Authenticated calls take the bearer
//! token explicitly so the session core stays the only owner of it.

pub mod http;
#[cfg(test)]
pub(crate) mod mock;
pub mod models;

pub use http::HttpApi;
pub use models::{
    Avatar, ContinueWatching, Credentials, HealthStatus, Identity, MaturityRating, Movie,
    MovieCategory, MovieQuery, Profile, ProfileDraft, ProfileUpdate, ProgressUpdate,
    TokenResponse, UserRole, ViewProgress,
};

use crate::error::ApiResult;
use async_trait::async_trait;
use std::collections::HashMap;

/// Every endpoint the client uses.
#[async_trait]
pub trait StreamingApi: Send + Sync {
    // ── Auth ──
    async fn login(&self, credentials: &Credentials) -> ApiResult<TokenResponse>;
    async fn register(&self, credentials: &Credentials) -> ApiResult<TokenResponse>;
    async fn me(&self, token: &str) -> ApiResult<Identity>;

    // ── Profiles ──
    async fn list_profiles(&self, token: &str) -> ApiResult<Vec<Profile>>;
    async fn create_profile(&self, token: &str, draft: &ProfileDraft) -> ApiResult<Profile>;
    async fn update_profile(
        &self,
        token: &str,
        profile_id: &str,
        update: &ProfileUpdate,
    ) -> ApiResult<Profile>;
    async fn delete_profile(&self, token: &str, profile_id: &str) -> ApiResult<()>;

    // ── Catalog (public) ──
    async fn list_movies(&self, query: &MovieQuery) -> ApiResult<Vec<Movie>>;
    async fn get_movie(&self, id_or_slug: &str) -> ApiResult<Movie>;
    async fn translations(&self, lang: &str) -> ApiResult<HashMap<String, String>>;
    async fn health(&self) -> ApiResult<HealthStatus>;

    // ── Viewing ──
    async fn continue_watching(
        &self,
        token: &str,
        profile_id: &str,
    ) -> ApiResult<Vec<ContinueWatching>>;
    async fn update_progress(
        &self,
        token: &str,
        profile_id: &str,
        movie_id: &str,
        update: &ProgressUpdate,
    ) -> ApiResult<()>;

    // ── Watchlist ──
    async fn watchlist(&self, token: &str, profile_id: &str) -> ApiResult<Vec<Movie>>;
    async fn watchlist_contains(
        &self,
        token: &str,
        profile_id: &str,
        movie_id: &str,
    ) -> ApiResult<bool>;
    async fn add_to_watchlist(&self, token: &str, profile_id: &str, movie_id: &str)
        -> ApiResult<()>;
    async fn remove_from_watchlist(
        &self,
        token: &str,
        profile_id: &str,
        movie_id: &str,
    ) -> ApiResult<()>;
}
