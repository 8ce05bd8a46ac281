//! Offer ledger: negotiation lifecycle over a listing's offers.
//!
//! Every mutation goes through the database so the per-offer state machine
//! holds across restarts, and accept/decline decisions are applied as a
//! compare-and-set on the `pending` status.

use thiserror::Error;
use tracing::{debug, info};

use autodeal_core::offer::{
    ListingStatus, Offer, OfferDecision, OfferError, OfferParty, validate_amount,
};

use crate::storage::{Database, DatabaseError};

/// Errors from offer ledger operations.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error(transparent)]
    Offer(#[from] OfferError),

    #[error("Listing not found: {0}")]
    ListingNotFound(String),

    #[error("Offer not found: {0}")]
    OfferNotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Manages the offer ledgers of all listings.
#[derive(Clone)]
pub struct OfferLedger {
    db: Database,
}

impl OfferLedger {
    /// Create a new offer ledger over the given database.
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Append a new pending offer to a listing's ledger.
    ///
    /// Fails with [`OfferError::InvalidAmount`] for non-positive amounts and
    /// [`NegotiationError::ListingNotFound`] for unknown listings. Any other
    /// pending offer on the ledger is left untouched.
    pub async fn submit_offer(
        &self,
        listing_id: &str,
        buyer_id: &str,
        party: OfferParty,
        amount_cents: i64,
        message: &str,
    ) -> Result<Offer, NegotiationError> {
        validate_amount(amount_cents)?;

        self.db.get_listing(listing_id).await.map_err(|e| match e {
            DatabaseError::NotFound(_) => NegotiationError::ListingNotFound(listing_id.to_string()),
            other => NegotiationError::Database(other),
        })?;

        let id = self
            .db
            .insert_offer(listing_id, buyer_id, party, amount_cents, message)
            .await?;
        let offer = self.db.get_offer(id).await?.into_offer()?;

        info!(
            offer_id = offer.id,
            listing_id,
            party = %party,
            amount_cents,
            seq = offer.seq,
            "Offer submitted"
        );

        Ok(offer)
    }

    /// Accept a pending offer.
    pub async fn accept(&self, offer_id: i64) -> Result<Offer, NegotiationError> {
        self.decide(offer_id, OfferDecision::Accept).await
    }

    /// Decline a pending offer.
    pub async fn decline(&self, offer_id: i64) -> Result<Offer, NegotiationError> {
        self.decide(offer_id, OfferDecision::Decline).await
    }

    /// Submit a counter-proposal from the answering party.
    ///
    /// A counter is an ordinary offer from the other side of the table; it
    /// never closes the offer being countered.
    pub async fn counter(
        &self,
        listing_id: &str,
        buyer_id: &str,
        party: OfferParty,
        amount_cents: i64,
        message: &str,
    ) -> Result<Offer, NegotiationError> {
        debug!(listing_id, party = %party, amount_cents, "Counter offer");
        self.submit_offer(listing_id, buyer_id, party, amount_cents, message)
            .await
    }

    /// A listing's full ledger, in submission order.
    pub async fn offers(&self, listing_id: &str) -> Result<Vec<Offer>, NegotiationError> {
        let rows = self.db.list_offers(listing_id).await?;
        rows.into_iter()
            .map(|row| row.into_offer().map_err(NegotiationError::from))
            .collect()
    }

    /// Marketplace status of a listing, derived from its pending offers.
    pub async fn listing_status(
        &self,
        listing_id: &str,
    ) -> Result<ListingStatus, NegotiationError> {
        let pending = self.db.pending_offer_count(listing_id).await?;
        Ok(ListingStatus::from_pending_count(pending))
    }

    async fn decide(
        &self,
        offer_id: i64,
        decision: OfferDecision,
    ) -> Result<Offer, NegotiationError> {
        let target = decision.target();
        let updated = self.db.resolve_offer(offer_id, target).await?;

        if updated == 0 {
            // Nothing was pending under that id: either the offer does not
            // exist, or it already reached a terminal state.
            let row = self.db.get_offer(offer_id).await.map_err(|e| match e {
                DatabaseError::NotFound(_) => NegotiationError::OfferNotFound(offer_id),
                other => NegotiationError::Database(other),
            })?;
            let status = row.status.parse().map_err(OfferError::from)?;
            return Err(OfferError::InvalidTransition(status).into());
        }

        let offer = self.db.get_offer(offer_id).await?.into_offer()?;

        info!(offer_id, status = %offer.status, "Offer resolved");

        Ok(offer)
    }
}
