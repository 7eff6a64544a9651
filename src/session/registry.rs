//! Profile CRUD over the session's profile set.
//!
//! Count bounds are admission checks evaluated locally against the current
//! set; a request that fails them never reaches the server. Every successful
//! mutation is followed by a full identity + profile refresh rather than a
//! local merge.

use super::machine::AuthSession;
use crate::api::{Profile, ProfileDraft, ProfileUpdate};
use crate::error::{SessionError, SessionResult};

/// Upper bound on profiles per account.
pub const MAX_PROFILES: usize = 5;
/// At least this many profiles must remain after a delete.
pub const MIN_PROFILES: usize = 1;

/// A delete that has been checked but not yet confirmed.
///
/// Obtained from [`ProfileRegistry::prepare_delete`]; passing it to
/// [`ProfileRegistry::delete`] is the confirmation. It is only valid for the
/// session it was prepared in.
#[must_use = "nothing is deleted until the pending deletion is confirmed"]
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDeletion {
    profile: Profile,
    epoch: u64,
}

impl PendingDeletion {
    pub fn profile(&self) -> &Profile {
        &self.profile
    }
}

pub struct ProfileRegistry<'a> {
    session: &'a AuthSession,
}

impl<'a> ProfileRegistry<'a> {
    pub fn new(session: &'a AuthSession) -> Self {
        Self { session }
    }

    fn count(&self) -> Option<usize> {
        self.session
            .state()
            .account()
            .map(|account| account.profiles().len())
    }

    /// Whether a create would pass the local admission check.
    pub fn can_create(&self) -> bool {
        self.count().is_some_and(|n| n < MAX_PROFILES)
    }

    /// Whether a delete would pass the local admission check.
    pub fn can_delete(&self) -> bool {
        self.count().is_some_and(|n| n > MIN_PROFILES)
    }

    pub async fn create(&self, draft: ProfileDraft) -> SessionResult<Profile> {
        let ticket = self.session.ticket()?;
        if ticket.account.profiles().len() >= MAX_PROFILES {
            return Err(SessionError::ValidationRejected(format!(
                "Maximum {MAX_PROFILES} profiles allowed"
            )));
        }

        let profile = self
            .session
            .api()
            .create_profile(&ticket.token, &draft)
            .await
            .map_err(|e| self.session.fail_request(ticket.epoch, e))?;
        tracing::info!(profile_id = %profile.id, "Profile created");

        self.session.refresh(ticket.epoch).await?;
        Ok(profile)
    }

    /// Check a delete without issuing it.
    pub fn prepare_delete(&self, profile_id: &str) -> SessionResult<PendingDeletion> {
        let ticket = self.session.ticket()?;
        let profile = ticket
            .account
            .profiles()
            .iter()
            .find(|p| p.id == profile_id)
            .cloned()
            .ok_or_else(|| {
                SessionError::ValidationRejected(format!("Unknown profile '{profile_id}'"))
            })?;
        check_can_delete(ticket.account.profiles().len())?;

        Ok(PendingDeletion {
            profile,
            epoch: ticket.epoch,
        })
    }

    /// Issue a confirmed delete.
    ///
    /// If the deleted profile was active, the refresh leaves no profile
    /// selected.
    pub async fn delete(&self, pending: PendingDeletion) -> SessionResult<()> {
        let ticket = self.session.ticket()?;
        if ticket.epoch != pending.epoch {
            return Err(SessionError::Superseded);
        }
        let profile_id = pending.profile.id.as_str();
        if !ticket.account.contains(profile_id) {
            return Err(SessionError::ValidationRejected(format!(
                "Unknown profile '{profile_id}'"
            )));
        }
        check_can_delete(ticket.account.profiles().len())?;

        self.session
            .api()
            .delete_profile(&ticket.token, profile_id)
            .await
            .map_err(|e| self.session.fail_request(ticket.epoch, e))?;
        tracing::info!(profile_id, "Profile deleted");

        self.session.refresh(ticket.epoch).await
    }

    pub async fn update(&self, profile_id: &str, update: ProfileUpdate) -> SessionResult<Profile> {
        let ticket = self.session.ticket()?;
        if !ticket.account.contains(profile_id) {
            return Err(SessionError::ValidationRejected(format!(
                "Unknown profile '{profile_id}'"
            )));
        }
        if update.is_empty() {
            return Err(SessionError::ValidationRejected("Nothing to update".into()));
        }

        let profile = self
            .session
            .api()
            .update_profile(&ticket.token, profile_id, &update)
            .await
            .map_err(|e| self.session.fail_request(ticket.epoch, e))?;
        tracing::info!(profile_id, "Profile updated");

        self.session.refresh(ticket.epoch).await?;
        Ok(profile)
    }
}

fn check_can_delete(count: usize) -> SessionResult<()> {
    if count <= MIN_PROFILES {
        return Err(SessionError::ValidationRejected(
            "At least one profile must remain".into(),
        ));
    }
    Ok(())
}
