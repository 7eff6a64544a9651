//! StreamFlix client core.
//!
//! The session context ([`AuthSession`]) owns the credential token, the
//! signed-in identity, its viewing profiles and the active profile.
//! [`ProfileRegistry`] mutates the profile set, [`NavigationGate`] derives
//! which top-level mode may be shown, and [`Library`] scopes content calls to
//! the active profile. Everything talks to the server through the
//! [`StreamingApi`] trait.

pub mod api;
pub mod config;
pub mod error;
pub mod library;
pub mod playback;
pub mod session;

pub use api::{HttpApi, StreamingApi};
pub use config::ClientConfig;
pub use error::{ApiError, SessionError, SessionResult};
pub use library::{Catalog, Library};
pub use playback::PlaybackTracker;
pub use session::{
    AppMode, AuthSession, FileTokenStore, NavigationGate, ProfileRegistry, ProfileSelectionPolicy,
    SessionState,
};
