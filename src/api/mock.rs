//! In-memory stand-in for the StreamFlix server, used by session tests.
//!
//! Behaves like the real API for one account and records every call so tests
//! can assert that local admission checks never reached the boundary.

use super::models::*;
use super::StreamingApi;
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

pub(crate) const EMAIL: &str = "viewer@example.com";
pub(crate) const PASSWORD: &str = "correct-horse";

/// Holds the next call to one endpoint open until released.
pub(crate) struct Hold {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

#[derive(Default)]
pub(crate) struct MockApi {
    pub calls: Mutex<Vec<String>>,
    pub profiles: Mutex<Vec<Profile>>,
    pub watchlist: Mutex<Vec<String>>,
    pub progress: Mutex<Vec<(String, String, ProgressUpdate)>>,
    pub fail_me: AtomicBool,
    pub fail_profiles: AtomicBool,
    pub revoke_tokens: AtomicBool,
    pub holds: Mutex<HashMap<&'static str, Hold>>,
    next_id: AtomicUsize,
    issued: AtomicUsize,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_profiles(names: &[&str]) -> Arc<Self> {
        let api = Self::default();
        for name in names {
            let profile = api.make_profile(name, Avatar::Blue);
            api.profiles.lock().push(profile);
        }
        Arc::new(api)
    }

    /// Arrange for the next call to `endpoint` to block until `release` is
    /// notified. `entered` fires once the call is parked.
    pub fn hold_next(&self, endpoint: &'static str) -> (Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        self.holds.lock().insert(
            endpoint,
            Hold {
                entered: entered.clone(),
                release: release.clone(),
            },
        );
        (entered, release)
    }

    pub fn call_count(&self, endpoint: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == endpoint).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn profile_id(&self, name: &str) -> String {
        self.profiles
            .lock()
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.id.clone())
            .unwrap_or_default()
    }

    fn record(&self, endpoint: &str) {
        self.calls.lock().push(endpoint.to_string());
    }

    async fn pause(&self, endpoint: &str) {
        let hold = self.holds.lock().remove(endpoint);
        if let Some(hold) = hold {
            hold.entered.notify_one();
            hold.release.notified().await;
        }
    }

    fn make_profile(&self, name: &str, avatar: Avatar) -> Profile {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Profile {
            id: format!("p{n}"),
            name: name.to_string(),
            avatar,
            language: "en".into(),
            maturity_rating: MaturityRating::Pg13,
        }
    }

    fn issue_token(&self) -> TokenResponse {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        TokenResponse {
            access_token: format!("token-{n}"),
            refresh_token: None,
            token_type: "bearer".into(),
        }
    }

    fn authorize(&self, token: &str) -> ApiResult<()> {
        if token.is_empty() || self.revoke_tokens.load(Ordering::SeqCst) {
            return Err(rejected(401, "Invalid token"));
        }
        Ok(())
    }

    fn owned(&self, profile_id: &str) -> ApiResult<()> {
        if self.profiles.lock().iter().any(|p| p.id == profile_id) {
            Ok(())
        } else {
            Err(rejected(404, "Profile not found"))
        }
    }
}

fn rejected(status: u16, message: &str) -> ApiError {
    ApiError::Rejected {
        status,
        message: message.into(),
    }
}

pub(crate) fn movie(id: &str) -> Movie {
    Movie {
        id: id.into(),
        slug: format!("slug-{id}"),
        title: format!("Movie {id}"),
        description: String::new(),
        category: MovieCategory::Drama,
        poster_url: String::new(),
        backdrop_url: String::new(),
        video_url: String::new(),
        release_year: 2020,
        rating: 7.0,
        duration_minutes: 100,
        tags: Vec::new(),
        languages: Vec::new(),
        i18n: HashMap::new(),
    }
}

#[async_trait]
impl StreamingApi for MockApi {
    async fn login(&self, credentials: &Credentials) -> ApiResult<TokenResponse> {
        self.record("login");
        self.pause("login").await;
        if credentials.email == EMAIL && credentials.password == PASSWORD {
            Ok(self.issue_token())
        } else {
            Err(rejected(401, "Invalid email or password"))
        }
    }

    async fn register(&self, credentials: &Credentials) -> ApiResult<TokenResponse> {
        self.record("register");
        if credentials.email == EMAIL {
            return Err(rejected(400, "Email already registered"));
        }
        Ok(self.issue_token())
    }

    async fn me(&self, token: &str) -> ApiResult<Identity> {
        self.record("me");
        self.pause("me").await;
        self.authorize(token)?;
        if self.fail_me.load(Ordering::SeqCst) {
            return Err(ApiError::Network("connection reset".into()));
        }
        Ok(Identity {
            id: "u1".into(),
            email: EMAIL.into(),
            role: UserRole::User,
        })
    }

    async fn list_profiles(&self, token: &str) -> ApiResult<Vec<Profile>> {
        self.record("list_profiles");
        self.authorize(token)?;
        if self.fail_profiles.load(Ordering::SeqCst) {
            return Err(rejected(500, "Internal Server Error"));
        }
        Ok(self.profiles.lock().clone())
    }

    async fn create_profile(&self, token: &str, draft: &ProfileDraft) -> ApiResult<Profile> {
        self.record("create_profile");
        self.authorize(token)?;
        let profile = self.make_profile(draft.name(), draft.avatar());
        self.profiles.lock().push(profile.clone());
        self.pause("create_profile").await;
        Ok(profile)
    }

    async fn update_profile(
        &self,
        token: &str,
        profile_id: &str,
        update: &ProfileUpdate,
    ) -> ApiResult<Profile> {
        self.record("update_profile");
        self.authorize(token)?;
        let mut profiles = self.profiles.lock();
        let profile = profiles
            .iter_mut()
            .find(|p| p.id == profile_id)
            .ok_or_else(|| rejected(404, "Profile not found"))?;
        if let Some(name) = &update.name {
            profile.name = name.clone();
        }
        if let Some(avatar) = update.avatar {
            profile.avatar = avatar;
        }
        Ok(profile.clone())
    }

    async fn delete_profile(&self, token: &str, profile_id: &str) -> ApiResult<()> {
        self.record("delete_profile");
        self.authorize(token)?;
        self.owned(profile_id)?;
        self.profiles.lock().retain(|p| p.id != profile_id);
        Ok(())
    }

    async fn list_movies(&self, query: &MovieQuery) -> ApiResult<Vec<Movie>> {
        self.record("list_movies");
        let all = vec![movie("m1"), movie("m2")];
        Ok(match &query.search {
            Some(term) => all.into_iter().filter(|m| m.title.contains(term)).collect(),
            None => all,
        })
    }

    async fn get_movie(&self, id_or_slug: &str) -> ApiResult<Movie> {
        self.record("get_movie");
        if id_or_slug.starts_with('m') {
            Ok(movie(id_or_slug))
        } else {
            Err(rejected(404, "Movie not found"))
        }
    }

    async fn translations(&self, lang: &str) -> ApiResult<HashMap<String, String>> {
        self.record("translations");
        let home = if lang == "es" { "Inicio" } else { "Home" };
        Ok(HashMap::from([("home".to_string(), home.to_string())]))
    }

    async fn health(&self) -> ApiResult<HealthStatus> {
        self.record("health");
        Ok(HealthStatus {
            status: "healthy".into(),
            timestamp: None,
        })
    }

    async fn continue_watching(
        &self,
        token: &str,
        profile_id: &str,
    ) -> ApiResult<Vec<ContinueWatching>> {
        self.record("continue_watching");
        self.authorize(token)?;
        self.owned(profile_id)?;
        Ok(self
            .progress
            .lock()
            .iter()
            .filter(|(p, _, u)| p == profile_id && !u.completed && u.progress_seconds > 30)
            .map(|(p, m, u)| ContinueWatching {
                movie: movie(m),
                progress: ViewProgress {
                    id: format!("v-{m}"),
                    profile_id: p.clone(),
                    movie_id: m.clone(),
                    progress_seconds: u.progress_seconds,
                    completed: u.completed,
                    last_watched: chrono::Utc::now(),
                },
            })
            .collect())
    }

    async fn update_progress(
        &self,
        token: &str,
        profile_id: &str,
        movie_id: &str,
        update: &ProgressUpdate,
    ) -> ApiResult<()> {
        self.record("update_progress");
        self.authorize(token)?;
        self.owned(profile_id)?;
        let mut progress = self.progress.lock();
        progress.retain(|(p, m, _)| !(p == profile_id && m == movie_id));
        progress.push((profile_id.to_string(), movie_id.to_string(), *update));
        Ok(())
    }

    async fn watchlist(&self, token: &str, profile_id: &str) -> ApiResult<Vec<Movie>> {
        self.record("watchlist");
        self.authorize(token)?;
        self.owned(profile_id)?;
        Ok(self.watchlist.lock().iter().map(|m| movie(m)).collect())
    }

    async fn watchlist_contains(
        &self,
        token: &str,
        profile_id: &str,
        movie_id: &str,
    ) -> ApiResult<bool> {
        self.record("watchlist_contains");
        self.authorize(token)?;
        self.owned(profile_id)?;
        Ok(self.watchlist.lock().iter().any(|m| m == movie_id))
    }

    async fn add_to_watchlist(
        &self,
        token: &str,
        profile_id: &str,
        movie_id: &str,
    ) -> ApiResult<()> {
        self.record("add_to_watchlist");
        self.authorize(token)?;
        self.owned(profile_id)?;
        let mut list = self.watchlist.lock();
        if !list.iter().any(|m| m == movie_id) {
            list.push(movie_id.to_string());
        }
        Ok(())
    }

    async fn remove_from_watchlist(
        &self,
        token: &str,
        profile_id: &str,
        movie_id: &str,
    ) -> ApiResult<()> {
        self.record("remove_from_watchlist");
        self.authorize(token)?;
        self.owned(profile_id)?;
        self.watchlist.lock().retain(|m| m != movie_id);
        Ok(())
    }
}
