//! Session identity.
//!
//! Identity is accepted, not verified: the caller says who is acting and
//! operations that write on behalf of a user refuse to run anonymously.

use crate::store::{Filter, RecordStore};
use crate::types::Profile;
use crate::{Error, Result};
use chrono::Utc;
use uuid::Uuid;

/// The acting user for a chain of operations
#[derive(Clone, Debug)]
pub struct Session {
    current_user: Option<Uuid>,
}

impl Session {
    /// Session acting as a known user
    pub fn signed_in(user_id: Uuid) -> Self {
        Self {
            current_user: Some(user_id),
        }
    }

    /// Session with no identity attached
    pub fn anonymous() -> Self {
        Self { current_user: None }
    }

    /// The acting user, if any
    pub fn user_id(&self) -> Option<Uuid> {
        self.current_user
    }

    /// The acting user, or [`Error::AuthRequired`]
    ///
    /// Raised synchronously, before any store call is made.
    pub fn require_user(&self) -> Result<Uuid> {
        self.current_user.ok_or(Error::AuthRequired)
    }
}

/// Find a profile by display name, creating it on first use
pub fn lookup_or_create_profile<S: RecordStore>(store: &S, display_name: &str) -> Result<Profile> {
    let display_name = display_name.trim();
    if display_name.is_empty() {
        return Err(Error::Validation("profile name is empty".into()));
    }

    let mut found: Vec<Profile> = store.select(
        &Filter::all().eq("display_name", display_name),
        None,
        Some(1),
    )?;
    if let Some(profile) = found.pop() {
        return Ok(profile);
    }

    let mut inserted = store.insert(vec![Profile {
        id: None,
        display_name: display_name.to_string(),
        created_at: Utc::now(),
    }])?;
    let profile = inserted
        .pop()
        .ok_or_else(|| Error::Store("profile insert returned no row".into()))?;

    tracing::info!("Created profile '{}'", profile.display_name);
    Ok(profile)
}
