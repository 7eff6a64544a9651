//! Durable storage for the bearer token.
//!
//! The token is the only piece of client state that survives a restart. It is
//! opaque here: no parsing, no expiry checks. Persistence failures are logged
//! and never abort the session; the in-memory copy stays authoritative for
//! the running process.

use parking_lot::Mutex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Well-known file name of the persisted token inside the data directory.
pub const TOKEN_FILE: &str = "session_token";

/// Holder of the credential token.
pub trait TokenStore: Send + Sync {
    /// Current token, if any.
    fn get(&self) -> Option<String>;

    /// Replace the token and persist it.
    fn set(&self, token: &str);

    /// Erase the token from memory and from durable storage.
    fn clear(&self);

    /// Why the persisted token could not be read at open time, if it couldn't.
    fn load_error(&self) -> Option<String> {
        None
    }
}

// ── File-backed store ────────────────────────────────────────────

/// Token persisted to `<data_dir>/session_token`.
pub struct FileTokenStore {
    path: PathBuf,
    token: Mutex<Option<String>>,
    load_error: Option<String>,
}

impl FileTokenStore {
    /// Open the store, restoring a previously persisted token.
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(TOKEN_FILE);
        let (token, load_error) = match std::fs::read_to_string(&path) {
            Ok(raw) => {
                let token = raw.trim().to_string();
                ((!token.is_empty()).then_some(token), None)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => (None, None),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to read session token: {e}");
                (None, Some(format!("cannot read {}: {e}", path.display())))
            }
        };

        Self {
            path,
            token: Mutex::new(token),
            load_error,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, token: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        self.token.lock().clone()
    }

    fn set(&self, token: &str) {
        *self.token.lock() = Some(token.to_string());
        if let Err(e) = self.persist(token) {
            tracing::warn!(path = %self.path.display(), "Failed to persist session token: {e}");
        }
    }

    fn clear(&self) {
        *self.token.lock() = None;
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Failed to remove session token: {e}");
            }
        }
    }

    fn load_error(&self) -> Option<String> {
        self.load_error.clone()
    }
}

// ── In-memory store ──────────────────────────────────────────────

/// Non-durable store for embedding and tests.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token.lock().clone()
    }

    fn set(&self, token: &str) {
        *self.token.lock() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.token.lock() = None;
    }
}
