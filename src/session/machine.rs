//! Authentication session state machine.
//!
//! ```text
//! Unauthenticated ──start (token)──▸ Hydrating ──ok──▸ Authenticated
//!        ▲                              │                    │
//!        └────── failure (token erased) ┘                    │
//!        └──────────────────────── logout ───────────────────┘
//! ```
//!
//! [`AuthSession`] is the session context object: created once at startup,
//! passed by reference to whatever needs it, torn down on logout. Every state
//! change is published on a `watch` channel as a [`SessionSnapshot`].
//!
//! Each snapshot carries an `epoch`. It advances whenever a session begins or
//! ends, and any boundary response that comes back under an older epoch is
//! dropped instead of applied.

use crate::api::{Credentials, Identity, Profile, StreamingApi};
use crate::error::{ApiError, SessionError, SessionResult};
use crate::session::store::TokenStore;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// How the active profile is chosen when a session is (re)established.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileSelectionPolicy {
    /// Leave the active profile empty; the user picks one.
    #[default]
    Prompt,
    /// Select the first profile in server order.
    #[serde(rename = "first")]
    FirstProfile,
}

// ── State ────────────────────────────────────────────────────────

/// Identity, its profiles, and the active profile (by id).
///
/// The active profile is only ever an id into `profiles`; it is re-validated
/// every time the profile set is replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    identity: Identity,
    profiles: Vec<Profile>,
    active_profile_id: Option<String>,
}

impl Account {
    fn new(identity: Identity, profiles: Vec<Profile>, active_profile_id: Option<String>) -> Self {
        let mut account = Self {
            identity,
            profiles,
            active_profile_id,
        };
        account.reconcile();
        account
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn active_profile(&self) -> Option<&Profile> {
        let id = self.active_profile_id.as_deref()?;
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, profile_id: &str) -> bool {
        self.profiles.iter().any(|p| p.id == profile_id)
    }

    /// Look up by exact id, then by case-insensitive name.
    pub fn find_profile(&self, key: &str) -> Option<&Profile> {
        let key = key.trim();
        self.profiles
            .iter()
            .find(|p| p.id == key)
            .or_else(|| self.profiles.iter().find(|p| p.name.eq_ignore_ascii_case(key)))
    }

    fn reconcile(&mut self) {
        if let Some(id) = self.active_profile_id.as_deref() {
            if !self.contains(id) {
                self.active_profile_id = None;
            }
        }
    }
}

/// Session state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unauthenticated,
    Hydrating,
    Authenticated(Account),
    /// Durable token storage exists but could not be read.
    Failed { reason: String },
}

impl SessionState {
    pub fn account(&self) -> Option<&Account> {
        match self {
            Self::Authenticated(account) => Some(account),
            _ => None,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.account().map(Account::identity)
    }

    pub fn active_profile(&self) -> Option<&Profile> {
        self.account().and_then(Account::active_profile)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// A published state together with the session epoch it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub epoch: u64,
    /// Bumped by every publish that carries an active profile.
    pub selections: u64,
    pub state: SessionState,
}

/// Everything an authenticated request needs, captured at issue time.
pub(crate) struct Ticket {
    pub token: String,
    pub epoch: u64,
    pub account: Account,
}

#[derive(Clone, Copy)]
enum Selection {
    /// New session: apply the selection policy.
    Fresh,
    /// Same session: keep the current active profile if it still exists.
    Preserve,
}

struct Inner {
    epoch: u64,
    selections: u64,
    state: SessionState,
}

// ── Session context ──────────────────────────────────────────────

/// Owner of identity, profiles and the active profile.
pub struct AuthSession {
    api: Arc<dyn StreamingApi>,
    store: Arc<dyn TokenStore>,
    policy: ProfileSelectionPolicy,
    inner: Mutex<Inner>,
    tx: watch::Sender<SessionSnapshot>,
}

impl AuthSession {
    pub fn new(
        api: Arc<dyn StreamingApi>,
        store: Arc<dyn TokenStore>,
        policy: ProfileSelectionPolicy,
    ) -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot {
            epoch: 0,
            selections: 0,
            state: SessionState::Unauthenticated,
        });

        Self {
            api,
            store,
            policy,
            inner: Mutex::new(Inner {
                epoch: 0,
                selections: 0,
                state: SessionState::Unauthenticated,
            }),
            tx,
        }
    }

    pub fn api(&self) -> &dyn StreamingApi {
        self.api.as_ref()
    }

    /// Receive every published snapshot. The receiver starts at the current one.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock();
        SessionSnapshot {
            epoch: inner.epoch,
            selections: inner.selections,
            state: inner.state.clone(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state.clone()
    }

    fn publish(&self, inner: &mut Inner) {
        if inner.state.active_profile().is_some() {
            inner.selections += 1;
        }
        self.tx.send_replace(SessionSnapshot {
            epoch: inner.epoch,
            selections: inner.selections,
            state: inner.state.clone(),
        });
    }

    /// Restore the session from the stored token, if there is one.
    pub async fn start(&self) -> SessionState {
        let epoch = {
            let mut inner = self.inner.lock();
            inner.epoch += 1;
            if let Some(reason) = self.store.load_error() {
                tracing::warn!("Session storage unusable: {reason}");
                inner.state = SessionState::Failed { reason };
                self.publish(&mut inner);
                None
            } else if self.store.get().is_none() {
                inner.state = SessionState::Unauthenticated;
                self.publish(&mut inner);
                None
            } else {
                inner.state = SessionState::Hydrating;
                self.publish(&mut inner);
                Some(inner.epoch)
            }
        };

        if let Some(epoch) = epoch {
            // Failure is already reflected in the published state.
            let _ = self.load_account(epoch, Selection::Fresh).await;
        }
        self.state()
    }

    pub async fn login(&self, email: &str, password: &str) -> SessionResult<()> {
        let credentials = Credentials::new(email, password);
        let epoch = self.current_epoch();
        match self.api.login(&credentials).await {
            Ok(token) => self.begin(epoch, &token.access_token, "login").await,
            Err(err) => Err(self.credential_failure(epoch, err, "login")),
        }
    }

    pub async fn register(&self, email: &str, password: &str) -> SessionResult<()> {
        let credentials = Credentials::new(email, password);
        let epoch = self.current_epoch();
        match self.api.register(&credentials).await {
            Ok(token) => self.begin(epoch, &token.access_token, "register").await,
            Err(err) => Err(self.credential_failure(epoch, err, "register")),
        }
    }

    /// Re-fetch identity and profiles with the stored token.
    ///
    /// Keeps the current profile selection when the session is already
    /// authenticated. Any failure erases the token.
    pub async fn hydrate(&self) -> SessionResult<()> {
        let (epoch, selection) = {
            let mut inner = self.inner.lock();
            if self.store.get().is_none() {
                if inner.state.is_authenticated() {
                    inner.epoch += 1;
                }
                inner.state = SessionState::Unauthenticated;
                self.publish(&mut inner);
                return Err(SessionError::NotAuthenticated);
            }
            let selection = if inner.state.is_authenticated() {
                Selection::Preserve
            } else {
                inner.state = SessionState::Hydrating;
                self.publish(&mut inner);
                Selection::Fresh
            };
            (inner.epoch, selection)
        };

        self.load_account(epoch, selection).await
    }

    /// End the session: token, identity, profiles and selection go together.
    pub fn logout(&self) {
        let mut inner = self.inner.lock();
        inner.epoch += 1;
        self.store.clear();
        inner.state = SessionState::Unauthenticated;
        self.publish(&mut inner);
        tracing::info!("Signed out");
    }

    /// Make `profile_id` active. Ids outside the current set are ignored.
    pub fn switch_profile(&self, profile_id: &str) -> bool {
        let mut inner = self.inner.lock();
        let SessionState::Authenticated(account) = &mut inner.state else {
            tracing::debug!(profile_id, "Ignoring profile switch without a session");
            return false;
        };
        if !account.contains(profile_id) {
            tracing::debug!(profile_id, "Ignoring switch to unknown profile");
            return false;
        }
        account.active_profile_id = Some(profile_id.to_string());
        self.publish(&mut inner);
        true
    }

    /// Return to profile selection without touching identity or profiles.
    pub fn leave_profile(&self) -> bool {
        let mut inner = self.inner.lock();
        let SessionState::Authenticated(account) = &mut inner.state else {
            return false;
        };
        if account.active_profile_id.take().is_none() {
            return false;
        }
        self.publish(&mut inner);
        true
    }

    // ── Crate-internal plumbing for registry and library ─────────

    pub(crate) fn ticket(&self) -> SessionResult<Ticket> {
        let inner = self.inner.lock();
        let SessionState::Authenticated(account) = &inner.state else {
            return Err(SessionError::NotAuthenticated);
        };
        let token = self.store.get().ok_or(SessionError::NotAuthenticated)?;
        Ok(Ticket {
            token,
            epoch: inner.epoch,
            account: account.clone(),
        })
    }

    pub(crate) fn is_current(&self, epoch: u64) -> bool {
        self.inner.lock().epoch == epoch
    }

    fn current_epoch(&self) -> u64 {
        self.inner.lock().epoch
    }

    /// Classify a failed authenticated call. A refused token ends the session.
    pub(crate) fn fail_request(&self, epoch: u64, err: ApiError) -> SessionError {
        if err.is_unauthorized() {
            let mut inner = self.inner.lock();
            if inner.epoch != epoch {
                return SessionError::Superseded;
            }
            tracing::warn!("Server refused session token: {err}");
            self.invalidate(&mut inner);
        } else if !self.is_current(epoch) {
            return SessionError::Superseded;
        }
        SessionError::from_request(err)
    }

    /// Re-fetch identity + profiles after a mutation, keeping the selection
    /// only if it still exists.
    pub(crate) async fn refresh(&self, epoch: u64) -> SessionResult<()> {
        self.load_account(epoch, Selection::Preserve).await
    }

    // ── Internals ────────────────────────────────────────────────

    fn invalidate(&self, inner: &mut Inner) {
        inner.epoch += 1;
        self.store.clear();
        inner.state = SessionState::Unauthenticated;
        self.publish(inner);
    }

    fn credential_failure(&self, epoch: u64, err: ApiError, via: &str) -> SessionError {
        if !self.is_current(epoch) {
            return SessionError::Superseded;
        }
        let err = SessionError::from_credentials(err);
        tracing::info!(via, "Credentials not accepted: {err}");
        err
    }

    async fn begin(&self, epoch: u64, token: &str, via: &str) -> SessionResult<()> {
        let epoch = {
            let mut inner = self.inner.lock();
            if inner.epoch != epoch {
                tracing::warn!(via, "Discarding credentials accepted for a superseded session");
                return Err(SessionError::Superseded);
            }
            inner.epoch += 1;
            self.store.set(token);
            inner.state = SessionState::Hydrating;
            self.publish(&mut inner);
            inner.epoch
        };
        tracing::info!(via, "Credentials accepted");
        self.load_account(epoch, Selection::Fresh).await
    }

    /// Identity first, then profiles. Both land together or not at all.
    async fn load_account(&self, epoch: u64, selection: Selection) -> SessionResult<()> {
        let Some(token) = self.store.get() else {
            let mut inner = self.inner.lock();
            if inner.epoch != epoch {
                return Err(SessionError::Superseded);
            }
            self.invalidate(&mut inner);
            return Err(SessionError::SessionInvalid("no stored token".into()));
        };

        let fetched = match self.api.me(&token).await {
            Ok(identity) if self.is_current(epoch) => self
                .api
                .list_profiles(&token)
                .await
                .map(|profiles| (identity, profiles)),
            Ok(_) => return Err(self.stale("identity")),
            Err(err) => Err(err),
        };

        let mut inner = self.inner.lock();
        if inner.epoch != epoch {
            drop(inner);
            return Err(self.stale("profiles"));
        }

        match fetched {
            Ok((identity, profiles)) => {
                let active = match selection {
                    Selection::Fresh => match self.policy {
                        ProfileSelectionPolicy::Prompt => None,
                        ProfileSelectionPolicy::FirstProfile => {
                            profiles.first().map(|p| p.id.clone())
                        }
                    },
                    Selection::Preserve => inner
                        .state
                        .account()
                        .and_then(|a| a.active_profile_id.clone()),
                };
                let account = Account::new(identity, profiles, active);
                tracing::debug!(
                    profiles = account.profiles.len(),
                    active = account.active_profile_id.as_deref().unwrap_or("-"),
                    "Session hydrated"
                );
                inner.state = SessionState::Authenticated(account);
                self.publish(&mut inner);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("Session hydration failed, signing out: {err}");
                self.invalidate(&mut inner);
                Err(SessionError::SessionInvalid(err.to_string()))
            }
        }
    }

    fn stale(&self, what: &str) -> SessionError {
        tracing::warn!(what, "Ignoring response for a superseded session");
        SessionError::Superseded
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockApi, EMAIL, PASSWORD};
    use crate::session::store::MemoryTokenStore;
    use std::sync::atomic::Ordering;

    fn session(api: &Arc<MockApi>, store: &Arc<MemoryTokenStore>) -> AuthSession {
        AuthSession::new(api.clone(), store.clone(), ProfileSelectionPolicy::Prompt)
    }

    struct BrokenStore;

    impl TokenStore for BrokenStore {
        fn get(&self) -> Option<String> {
            None
        }
        fn set(&self, _token: &str) {}
        fn clear(&self) {}
        fn load_error(&self) -> Option<String> {
            Some("permission denied".into())
        }
    }

    #[tokio::test]
    async fn start_without_token_stays_unauthenticated() {
        let api = MockApi::new();
        let store = Arc::new(MemoryTokenStore::new());
        let session = session(&api, &store);

        assert_eq!(session.start().await, SessionState::Unauthenticated);
        assert_eq!(api.total_calls(), 0);
    }

    #[tokio::test]
    async fn start_with_token_fetches_identity_then_profiles() {
        let api = MockApi::with_profiles(&["A", "B"]);
        let store = Arc::new(MemoryTokenStore::with_token("token-0"));
        let session = session(&api, &store);

        let state = session.start().await;
        let account = state.account().expect("authenticated");
        assert_eq!(account.identity().email, EMAIL);
        assert_eq!(account.profiles().len(), 2);
        assert!(account.active_profile().is_none());
        assert_eq!(*api.calls.lock(), vec!["me", "list_profiles"]);
    }

    #[tokio::test]
    async fn first_profile_policy_selects_first_in_server_order() {
        let api = MockApi::with_profiles(&["A", "B"]);
        let store = Arc::new(MemoryTokenStore::with_token("token-0"));
        let session = AuthSession::new(
            api.clone(),
            store.clone(),
            ProfileSelectionPolicy::FirstProfile,
        );

        let state = session.start().await;
        assert_eq!(state.active_profile().unwrap().name, "A");
    }

    #[tokio::test]
    async fn identity_failure_clears_token_and_skips_profiles() {
        let api = MockApi::with_profiles(&["A"]);
        api.fail_me.store(true, Ordering::SeqCst);
        let store = Arc::new(MemoryTokenStore::with_token("token-0"));
        let session = session(&api, &store);

        assert_eq!(session.start().await, SessionState::Unauthenticated);
        assert!(store.get().is_none());
        assert_eq!(api.call_count("list_profiles"), 0);
    }

    #[tokio::test]
    async fn profile_failure_discards_fetched_identity() {
        let api = MockApi::with_profiles(&["A"]);
        api.fail_profiles.store(true, Ordering::SeqCst);
        let store = Arc::new(MemoryTokenStore::with_token("token-0"));
        let session = session(&api, &store);

        assert_eq!(session.start().await, SessionState::Unauthenticated);
        assert!(session.state().identity().is_none());
        assert!(store.get().is_none());
    }

    #[tokio::test]
    async fn unreadable_storage_enters_failed_state() {
        let api = MockApi::new();
        let session = AuthSession::new(
            api.clone(),
            Arc::new(BrokenStore),
            ProfileSelectionPolicy::Prompt,
        );

        let state = session.start().await;
        assert!(matches!(state, SessionState::Failed { ref reason } if reason.contains("permission")));
        assert_eq!(api.total_calls(), 0);
    }

    #[tokio::test]
    async fn login_rejection_leaves_state_unchanged() {
        let api = MockApi::with_profiles(&["A"]);
        let store = Arc::new(MemoryTokenStore::new());
        let session = session(&api, &store);
        let before = session.snapshot();

        let err = session.login(EMAIL, "wrong").await.unwrap_err();
        assert_eq!(
            err,
            SessionError::AuthRejected("Invalid email or password".into())
        );
        assert_eq!(session.snapshot(), before);
        assert!(store.get().is_none());
    }

    #[tokio::test]
    async fn login_rejection_keeps_existing_session() {
        let api = MockApi::with_profiles(&["A"]);
        let store = Arc::new(MemoryTokenStore::new());
        let session = session(&api, &store);
        session.login(EMAIL, PASSWORD).await.unwrap();
        assert!(session.switch_profile(&api.profile_id("A")));
        let before = session.snapshot();

        assert!(session.login(EMAIL, "wrong").await.is_err());
        assert_eq!(session.snapshot(), before);
        assert_eq!(store.get().as_deref(), Some("token-1"));
    }

    #[tokio::test]
    async fn login_persists_token_and_lands_on_selection() {
        let api = MockApi::with_profiles(&["A", "B"]);
        let store = Arc::new(MemoryTokenStore::new());
        let session = session(&api, &store);

        session.login(EMAIL, PASSWORD).await.unwrap();
        assert_eq!(store.get().as_deref(), Some("token-1"));
        let state = session.state();
        assert_eq!(state.account().unwrap().profiles().len(), 2);
        assert!(state.active_profile().is_none());
    }

    #[tokio::test]
    async fn login_then_hydration_failure_is_unauthenticated() {
        let api = MockApi::with_profiles(&["A"]);
        api.fail_profiles.store(true, Ordering::SeqCst);
        let store = Arc::new(MemoryTokenStore::new());
        let session = session(&api, &store);

        let err = session.login(EMAIL, PASSWORD).await.unwrap_err();
        assert!(matches!(err, SessionError::SessionInvalid(_)));
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert!(store.get().is_none());
    }

    #[tokio::test]
    async fn register_uses_its_own_endpoint() {
        let api = MockApi::new();
        let store = Arc::new(MemoryTokenStore::new());
        let session = session(&api, &store);

        let err = session.register(EMAIL, "whatever").await.unwrap_err();
        assert_eq!(
            err,
            SessionError::AuthRejected("Email already registered".into())
        );

        session.register("new@example.com", "pw").await.unwrap();
        assert!(session.state().is_authenticated());
        assert_eq!(api.call_count("register"), 2);
        assert_eq!(api.call_count("login"), 0);
    }

    #[tokio::test]
    async fn switch_to_unknown_profile_is_ignored() {
        let api = MockApi::with_profiles(&["A", "B"]);
        let store = Arc::new(MemoryTokenStore::new());
        let session = session(&api, &store);
        session.login(EMAIL, PASSWORD).await.unwrap();

        let a = api.profile_id("A");
        assert!(session.switch_profile(&a));
        assert!(!session.switch_profile("p999"));
        assert_eq!(session.state().active_profile().unwrap().id, a);
    }

    #[tokio::test]
    async fn switch_without_session_is_ignored() {
        let session = session(&MockApi::new(), &Arc::new(MemoryTokenStore::new()));
        assert!(!session.switch_profile("p1"));
        assert!(!session.leave_profile());
    }

    #[tokio::test]
    async fn leave_profile_keeps_identity() {
        let api = MockApi::with_profiles(&["A"]);
        let store = Arc::new(MemoryTokenStore::new());
        let session = session(&api, &store);
        session.login(EMAIL, PASSWORD).await.unwrap();
        session.switch_profile(&api.profile_id("A"));

        assert!(session.leave_profile());
        let state = session.state();
        assert!(state.identity().is_some());
        assert!(state.active_profile().is_none());
    }

    #[tokio::test]
    async fn logout_clears_everything_at_once() {
        let api = MockApi::with_profiles(&["A"]);
        let store = Arc::new(MemoryTokenStore::new());
        let session = session(&api, &store);
        session.login(EMAIL, PASSWORD).await.unwrap();
        session.switch_profile(&api.profile_id("A"));
        let mut rx = session.subscribe();
        let epoch_before = rx.borrow_and_update().epoch;

        session.logout();

        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.state, SessionState::Unauthenticated);
        assert!(snapshot.epoch > epoch_before);
        assert!(store.get().is_none());
    }

    #[tokio::test]
    async fn relogin_does_not_restore_previous_selection() {
        let api = MockApi::with_profiles(&["A", "B"]);
        let store = Arc::new(MemoryTokenStore::new());
        let session = session(&api, &store);
        session.login(EMAIL, PASSWORD).await.unwrap();
        session.switch_profile(&api.profile_id("B"));

        session.logout();
        session.login(EMAIL, PASSWORD).await.unwrap();
        assert!(session.state().active_profile().is_none());
    }

    #[tokio::test]
    async fn explicit_hydrate_preserves_selection() {
        let api = MockApi::with_profiles(&["A", "B"]);
        let store = Arc::new(MemoryTokenStore::new());
        let session = session(&api, &store);
        session.login(EMAIL, PASSWORD).await.unwrap();
        session.switch_profile(&api.profile_id("B"));

        session.hydrate().await.unwrap();
        assert_eq!(session.state().active_profile().unwrap().name, "B");
    }

    #[tokio::test]
    async fn hydrate_without_token_is_not_authenticated() {
        let session = session(&MockApi::new(), &Arc::new(MemoryTokenStore::new()));
        assert_eq!(
            session.hydrate().await.unwrap_err(),
            SessionError::NotAuthenticated
        );
        assert_eq!(session.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn hydration_finishing_after_logout_is_discarded() {
        let api = MockApi::with_profiles(&["A"]);
        let store = Arc::new(MemoryTokenStore::with_token("token-0"));
        let session = Arc::new(session(&api, &store));
        let (entered, release) = api.hold_next("me");

        let task = tokio::spawn({
            let session = session.clone();
            async move { session.start().await }
        });
        entered.notified().await;
        assert_eq!(session.state(), SessionState::Hydrating);

        session.logout();
        release.notify_one();
        task.await.unwrap();

        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert!(store.get().is_none());
        assert_eq!(api.call_count("list_profiles"), 0);
    }

    #[tokio::test]
    async fn login_response_after_logout_is_not_applied() {
        let api = MockApi::with_profiles(&["A"]);
        let store = Arc::new(MemoryTokenStore::new());
        let session = Arc::new(session(&api, &store));
        session.login(EMAIL, PASSWORD).await.unwrap();
        let (entered, release) = api.hold_next("login");

        let task = tokio::spawn({
            let session = session.clone();
            async move { session.login(EMAIL, PASSWORD).await }
        });
        entered.notified().await;
        session.logout();
        release.notify_one();

        assert_eq!(task.await.unwrap(), Err(SessionError::Superseded));
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert!(store.get().is_none());
        assert_eq!(api.call_count("me"), 1);
    }

    #[tokio::test]
    async fn subscribers_see_hydrating_then_authenticated() {
        let api = MockApi::with_profiles(&["A"]);
        let store = Arc::new(MemoryTokenStore::with_token("token-0"));
        let session = Arc::new(session(&api, &store));
        let mut rx = session.subscribe();
        let (entered, release) = api.hold_next("me");

        let task = tokio::spawn({
            let session = session.clone();
            async move { session.start().await }
        });
        entered.notified().await;
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().state, SessionState::Hydrating);

        release.notify_one();
        task.await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().state.is_authenticated());
    }

    #[test]
    fn account_lookup_by_id_or_name() {
        let profiles = vec![
            Profile {
                id: "p1".into(),
                name: "Ana".into(),
                avatar: Default::default(),
                language: "en".into(),
                maturity_rating: Default::default(),
            },
            Profile {
                id: "p2".into(),
                name: "Bo".into(),
                avatar: Default::default(),
                language: "en".into(),
                maturity_rating: Default::default(),
            },
        ];
        let identity = Identity {
            id: "u1".into(),
            email: EMAIL.into(),
            role: Default::default(),
        };
        let account = Account::new(identity, profiles, Some("p9".into()));

        assert!(account.active_profile().is_none(), "dangling id is dropped");
        assert_eq!(account.find_profile("p2").unwrap().name, "Bo");
        assert_eq!(account.find_profile(" ana ").unwrap().id, "p1");
        assert!(account.find_profile("cy").is_none());
    }
}
