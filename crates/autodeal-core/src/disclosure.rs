//! Contact disclosure rules.
//!
//! Whether a viewer gets to see a profile owner's name and phone is a pure
//! authorization decision over three inputs: who is asking, whose profile it
//! is, and whether an accepted offer links the two. The relationship lookup
//! itself lives in the daemon; this module only encodes the decision, so the
//! rules stay trivially testable.

use serde::{Deserialize, Serialize};

/// Mask shown to unauthenticated viewers.
pub const ANONYMOUS_NAME_MASK: &str = "****";
/// Phone mask shown to unauthenticated viewers.
pub const ANONYMOUS_PHONE_MASK: &str = "**********";
/// Placeholder shown to signed-in viewers without an accepted offer.
pub const HIDDEN_UNTIL_ACCEPTED: &str = "Hidden until offer accepted";

/// A stored profile with private contact fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactProfile {
    pub id: String,
    pub name: String,
    pub phone: String,
}

/// Disclosure-gated view of a profile handed to a specific viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactCard {
    pub owner_id: String,
    pub name: String,
    pub phone: String,
    pub contact_visible: bool,
}

/// Decide what `viewer_id` may see of `profile`.
///
/// `accepted_offer` is the outcome of the accepted-offer-between-users
/// lookup; `None` means the lookup failed, which degrades to the most
/// restrictive (masked) result rather than erroring.
///
/// Rules, in priority order:
/// 1. the owner always sees their own contact details;
/// 2. anonymous viewers get the `****` masks;
/// 3. signed-in viewers see real values only with an accepted offer, and the
///    "Hidden until offer accepted" placeholder otherwise.
pub fn disclose(
    profile: &ContactProfile,
    viewer_id: Option<&str>,
    accepted_offer: Option<bool>,
) -> ContactCard {
    match viewer_id {
        Some(viewer) if viewer == profile.id => ContactCard {
            owner_id: profile.id.clone(),
            name: profile.name.clone(),
            phone: profile.phone.clone(),
            contact_visible: true,
        },
        None => ContactCard {
            owner_id: profile.id.clone(),
            name: ANONYMOUS_NAME_MASK.to_string(),
            phone: ANONYMOUS_PHONE_MASK.to_string(),
            contact_visible: false,
        },
        Some(_) if accepted_offer == Some(true) => ContactCard {
            owner_id: profile.id.clone(),
            name: profile.name.clone(),
            phone: profile.phone.clone(),
            contact_visible: true,
        },
        // No accepted offer, or the lookup failed: fail closed.
        Some(_) => ContactCard {
            owner_id: profile.id.clone(),
            name: HIDDEN_UNTIL_ACCEPTED.to_string(),
            phone: HIDDEN_UNTIL_ACCEPTED.to_string(),
            contact_visible: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ContactProfile {
        ContactProfile {
            id: "owner-1".to_string(),
            name: "Jane Seller".to_string(),
            phone: "+15551234567".to_string(),
        }
    }

    #[test]
    fn owner_always_sees_own_contact() {
        let card = disclose(&profile(), Some("owner-1"), None);
        assert!(card.contact_visible);
        assert_eq!(card.name, "Jane Seller");
        assert_eq!(card.phone, "+15551234567");
    }

    #[test]
    fn anonymous_viewer_gets_masks() {
        let card = disclose(&profile(), None, Some(true));
        assert!(!card.contact_visible);
        assert_eq!(card.name, ANONYMOUS_NAME_MASK);
        assert_eq!(card.phone, ANONYMOUS_PHONE_MASK);
    }

    #[test]
    fn stranger_without_accepted_offer_sees_placeholder() {
        let card = disclose(&profile(), Some("viewer-2"), Some(false));
        assert!(!card.contact_visible);
        assert_eq!(card.name, HIDDEN_UNTIL_ACCEPTED);
        assert_eq!(card.phone, HIDDEN_UNTIL_ACCEPTED);
    }

    #[test]
    fn accepted_offer_reveals_contact() {
        let card = disclose(&profile(), Some("viewer-2"), Some(true));
        assert!(card.contact_visible);
        assert_eq!(card.name, "Jane Seller");
        assert_eq!(card.phone, "+15551234567");
    }

    #[test]
    fn failed_lookup_fails_closed() {
        let card = disclose(&profile(), Some("viewer-2"), None);
        assert!(!card.contact_visible);
        assert_eq!(card.name, HIDDEN_UNTIL_ACCEPTED);
    }
}
