//! Contact disclosure gate over stored profiles.
//!
//! Fetches the owner's profile and the accepted-offer relationship, then
//! delegates the actual decision to [`autodeal_core::disclosure`]. A failed
//! relationship lookup is not an error: the gate degrades to the masked
//! output instead.

use thiserror::Error;
use tracing::warn;

use autodeal_core::disclosure::{ContactCard, ContactProfile, disclose};

use crate::storage::{Database, DatabaseError};

/// Errors from contact resolution.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Decides what a viewer may see of a profile's contact fields.
#[derive(Clone)]
pub struct ContactGate {
    db: Database,
}

impl ContactGate {
    /// Create a new contact gate over the given database.
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Resolve the contact card `viewer_id` is allowed to see for `owner_id`.
    ///
    /// `viewer_id` is `None` for unauthenticated viewers.
    pub async fn resolve(
        &self,
        owner_id: &str,
        viewer_id: Option<&str>,
    ) -> Result<ContactCard, ContactError> {
        let row = self.db.get_profile(owner_id).await.map_err(|e| match e {
            DatabaseError::NotFound(_) => ContactError::ProfileNotFound(owner_id.to_string()),
            other => ContactError::Database(other),
        })?;

        let profile = ContactProfile {
            id: row.id,
            name: row.name,
            phone: row.phone,
        };

        // The relationship lookup only matters for an authenticated viewer
        // who is not the owner; a failure degrades to the masked branch.
        let accepted_offer = match viewer_id {
            Some(viewer) if viewer != owner_id => {
                match self.db.has_accepted_offer_between(viewer, owner_id).await {
                    Ok(linked) => Some(linked),
                    Err(e) => {
                        warn!(owner_id, viewer, error = %e, "Accepted-offer lookup failed, masking contact");
                        None
                    }
                }
            }
            _ => None,
        };

        Ok(disclose(&profile, viewer_id, accepted_offer))
    }
}
