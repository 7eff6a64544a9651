//! Session core: token storage, the authentication state machine, profile
//! CRUD and navigation gating.

pub mod gate;
pub mod machine;
pub mod registry;
pub mod store;

pub use gate::{derive_mode, AppMode, NavigationGate};
pub use machine::{Account, AuthSession, ProfileSelectionPolicy, SessionSnapshot, SessionState};
pub use registry::{PendingDeletion, ProfileRegistry, MAX_PROFILES, MIN_PROFILES};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_FILE};
