//! Offer domain types and the per-offer state machine.
//!
//! An offer is one entry in a listing's negotiation ledger: a proposed price
//! from one party, annotated with a message and a creation timestamp. The
//! state machine is deliberately small: `pending` may resolve to `accepted`
//! or `declined`, and both of those are terminal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from offer validation and state transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OfferError {
    /// Offer amounts must be strictly positive.
    #[error("offer amount must be positive, got {0}")]
    InvalidAmount(i64),

    /// Only pending offers can be accepted or declined.
    #[error("cannot resolve an offer that is already {0}")]
    InvalidTransition(OfferStatus),

    /// A stored string did not parse back into a domain enum.
    #[error("unknown {field}: {value}")]
    UnknownValue { field: &'static str, value: String },
}

/// Which side of the negotiation proposed an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferParty {
    Buyer,
    Seller,
}

impl OfferParty {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
        }
    }

    /// The other side of the table; a counter-offer comes from here.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Buyer => Self::Seller,
            Self::Seller => Self::Buyer,
        }
    }
}

impl fmt::Display for OfferParty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OfferParty {
    type Err = OfferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            other => Err(OfferError::UnknownValue {
                field: "offer party",
                value: other.to_string(),
            }),
        }
    }
}

/// Per-offer lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Declined,
}

impl OfferStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }

    /// Terminal states admit no further transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Declined)
    }

    /// Apply an accept/decline decision to this status.
    ///
    /// Only `Pending` offers can be resolved; anything else is an
    /// [`OfferError::InvalidTransition`].
    pub fn apply(self, decision: OfferDecision) -> Result<Self, OfferError> {
        if self == Self::Pending {
            Ok(decision.target())
        } else {
            Err(OfferError::InvalidTransition(self))
        }
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OfferStatus {
    type Err = OfferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            other => Err(OfferError::UnknownValue {
                field: "offer status",
                value: other.to_string(),
            }),
        }
    }
}

/// A resolution applied to a pending offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferDecision {
    Accept,
    Decline,
}

impl OfferDecision {
    pub const fn target(self) -> OfferStatus {
        match self {
            Self::Accept => OfferStatus::Accepted,
            Self::Decline => OfferStatus::Declined,
        }
    }
}

/// One entry in a listing's offer ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    /// Globally unique offer id.
    pub id: i64,
    pub listing_id: String,
    /// Position within the listing's ledger, starting at 1.
    pub seq: i64,
    /// The buyer in this negotiation (counter-offers from the seller are
    /// still addressed to a specific buyer).
    pub buyer_id: String,
    pub party: OfferParty,
    pub amount_cents: i64,
    pub status: OfferStatus,
    pub message: String,
    /// Unix seconds; the ledger ordering key together with `seq`.
    pub created_at: i64,
}

impl Offer {
    pub fn is_pending(&self) -> bool {
        self.status == OfferStatus::Pending
    }
}

/// Marketplace status of a listing, derived from its ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Available,
    Negotiating,
}

impl ListingStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Negotiating => "negotiating",
        }
    }

    /// A listing is negotiating while at least one offer on it is pending.
    pub const fn from_pending_count(pending: i64) -> Self {
        if pending > 0 {
            Self::Negotiating
        } else {
            Self::Available
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validate an offer amount, returning it unchanged when acceptable.
pub const fn validate_amount(amount_cents: i64) -> Result<i64, OfferError> {
    if amount_cents > 0 {
        Ok(amount_cents)
    } else {
        Err(OfferError::InvalidAmount(amount_cents))
    }
}
