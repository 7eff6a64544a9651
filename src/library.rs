//! Content operations on top of the session.
//!
//! [`Catalog`] covers the public endpoints and needs no session. [`Library`]
//! covers everything scoped to the active profile: continue watching, progress
//! reports and the watchlist.

use crate::api::{
    ContinueWatching, HealthStatus, Movie, MovieQuery, ProgressUpdate, StreamingApi,
};
use crate::error::{ApiResult, SessionError, SessionResult};
use crate::session::machine::Ticket;
use crate::session::AuthSession;
use std::collections::HashMap;

// ── Public catalog ───────────────────────────────────────────────

pub struct Catalog<'a> {
    api: &'a dyn StreamingApi,
}

impl<'a> Catalog<'a> {
    pub fn new(api: &'a dyn StreamingApi) -> Self {
        Self { api }
    }

    pub async fn list_movies(&self, query: &MovieQuery) -> ApiResult<Vec<Movie>> {
        self.api.list_movies(query).await
    }

    /// Look up by id or slug.
    pub async fn movie(&self, id_or_slug: &str) -> ApiResult<Movie> {
        self.api.get_movie(id_or_slug).await
    }

    pub async fn translations(&self, lang: &str) -> ApiResult<HashMap<String, String>> {
        self.api.translations(lang).await
    }

    pub async fn health(&self) -> ApiResult<HealthStatus> {
        self.api.health().await
    }
}

// ── Profile-scoped library ───────────────────────────────────────

struct Scope {
    ticket: Ticket,
    profile_id: String,
}

pub struct Library<'a> {
    session: &'a AuthSession,
}

impl<'a> Library<'a> {
    pub fn new(session: &'a AuthSession) -> Self {
        Self { session }
    }

    fn scope(&self) -> SessionResult<Scope> {
        let ticket = self.session.ticket()?;
        let profile_id = ticket
            .account
            .active_profile()
            .map(|p| p.id.clone())
            .ok_or(SessionError::NoActiveProfile)?;
        Ok(Scope { ticket, profile_id })
    }

    /// Apply the liveness check to a finished call.
    fn settle<T>(&self, epoch: u64, result: ApiResult<T>) -> SessionResult<T> {
        match result {
            Ok(_) if !self.session.is_current(epoch) => {
                tracing::warn!("Ignoring library response for a superseded session");
                Err(SessionError::Superseded)
            }
            Ok(value) => Ok(value),
            Err(err) => Err(self.session.fail_request(epoch, err)),
        }
    }

    pub async fn continue_watching(&self) -> SessionResult<Vec<ContinueWatching>> {
        let scope = self.scope()?;
        let result = self
            .session
            .api()
            .continue_watching(&scope.ticket.token, &scope.profile_id)
            .await;
        self.settle(scope.ticket.epoch, result)
    }

    pub async fn record_progress(&self, movie_id: &str, update: ProgressUpdate) -> SessionResult<()> {
        let scope = self.scope()?;
        tracing::debug!(
            profile_id = %scope.profile_id,
            movie_id,
            seconds = update.progress_seconds,
            completed = update.completed,
            "Reporting progress"
        );
        let result = self
            .session
            .api()
            .update_progress(&scope.ticket.token, &scope.profile_id, movie_id, &update)
            .await;
        self.settle(scope.ticket.epoch, result)
    }

    pub async fn watchlist(&self) -> SessionResult<Vec<Movie>> {
        let scope = self.scope()?;
        let result = self
            .session
            .api()
            .watchlist(&scope.ticket.token, &scope.profile_id)
            .await;
        self.settle(scope.ticket.epoch, result)
    }

    pub async fn in_watchlist(&self, movie_id: &str) -> SessionResult<bool> {
        let scope = self.scope()?;
        let result = self
            .session
            .api()
            .watchlist_contains(&scope.ticket.token, &scope.profile_id, movie_id)
            .await;
        self.settle(scope.ticket.epoch, result)
    }

    pub async fn add_to_watchlist(&self, movie_id: &str) -> SessionResult<()> {
        let scope = self.scope()?;
        let result = self
            .session
            .api()
            .add_to_watchlist(&scope.ticket.token, &scope.profile_id, movie_id)
            .await;
        self.settle(scope.ticket.epoch, result)
    }

    pub async fn remove_from_watchlist(&self, movie_id: &str) -> SessionResult<()> {
        let scope = self.scope()?;
        let result = self
            .session
            .api()
            .remove_from_watchlist(&scope.ticket.token, &scope.profile_id, movie_id)
            .await;
        self.settle(scope.ticket.epoch, result)
    }

    /// Flip membership; returns whether the movie is now on the watchlist.
    pub async fn toggle_watchlist(&self, movie_id: &str) -> SessionResult<bool> {
        if self.in_watchlist(movie_id).await? {
            self.remove_from_watchlist(movie_id).await?;
            Ok(false)
        } else {
            self.add_to_watchlist(movie_id).await?;
            Ok(true)
        }
    }
}
