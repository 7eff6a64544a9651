//! Which top-level mode the presentation layer may show.
//!
//! [`derive_mode`] is the whole decision; [`NavigationGate`] pairs it with a
//! session subscription and the one piece of UI-local state it needs (whether
//! profile management was opened). That flag belongs to the session epoch it
//! was opened in, so it never survives a logout or a new login. It also dies
//! once any profile has been activated since, observed or not.

use super::machine::{AuthSession, SessionSnapshot, SessionState};
use std::fmt;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    LoginScreen,
    ProfileSelection,
    ProfileManagement,
    MainApplication,
}

impl AppMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::LoginScreen => "login",
            Self::ProfileSelection => "profile selection",
            Self::ProfileManagement => "profile management",
            Self::MainApplication => "main",
        }
    }
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Precedence: identity, then active profile, then the management request.
pub fn derive_mode(state: &SessionState, management_requested: bool) -> AppMode {
    let Some(account) = state.account() else {
        return AppMode::LoginScreen;
    };
    match account.active_profile() {
        Some(_) => AppMode::MainApplication,
        None if management_requested => AppMode::ProfileManagement,
        None => AppMode::ProfileSelection,
    }
}

/// Session observer that re-derives the mode on every published change.
pub struct NavigationGate {
    rx: watch::Receiver<SessionSnapshot>,
    /// `(epoch, selections)` at the moment profile management was opened.
    management: Option<(u64, u64)>,
}

impl NavigationGate {
    pub fn new(session: &AuthSession) -> Self {
        Self {
            rx: session.subscribe(),
            management: None,
        }
    }

    /// Mode for the latest published snapshot.
    pub fn mode(&mut self) -> AppMode {
        let snapshot = self.rx.borrow_and_update().clone();
        self.settle(&snapshot)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.rx.borrow().clone()
    }

    /// Open profile management. Only possible from profile selection.
    pub fn request_management(&mut self) -> bool {
        if self.mode() != AppMode::ProfileSelection {
            return false;
        }
        let snapshot = self.rx.borrow();
        self.management = Some((snapshot.epoch, snapshot.selections));
        true
    }

    pub fn close_management(&mut self) {
        self.management = None;
    }

    /// Wait for the next session change and return the resulting mode.
    ///
    /// Returns the current mode immediately if the session was dropped.
    pub async fn changed(&mut self) -> AppMode {
        if self.rx.changed().await.is_err() {
            tracing::debug!("Session closed, gate is frozen");
        }
        self.mode()
    }

    /// Management ends with its session or once a profile is active.
    fn settle(&mut self, snapshot: &SessionSnapshot) -> AppMode {
        let open = self.management == Some((snapshot.epoch, snapshot.selections));
        let mode = derive_mode(&snapshot.state, open);
        if mode != AppMode::ProfileManagement {
            self.management = None;
        }
        mode
    }
}
