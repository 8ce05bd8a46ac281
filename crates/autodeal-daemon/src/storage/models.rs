//! Database models for the `AutoDeal` daemon.

use serde::{Deserialize, Serialize};

use autodeal_core::offer::{Offer, OfferError};

/// Profile record from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProfileRow {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub created_at: i64,
}

/// Listing record from the database.
///
/// The marketplace status is not stored; it is derived from the offer
/// ledger at read time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ListingRow {
    pub id: String,
    pub seller_id: String,
    pub title: String,
    pub price_cents: i64,
    pub year: i64,
    pub mileage: i64,
    pub location: String,
    pub description: String,
    /// JSON array of feature strings.
    pub features: String,
    pub created_at: i64,
}

impl ListingRow {
    /// Decode the stored feature set; malformed JSON degrades to empty.
    pub fn feature_list(&self) -> Vec<String> {
        serde_json::from_str(&self.features).unwrap_or_default()
    }
}

/// Offer record from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OfferRow {
    pub id: i64,
    pub listing_id: String,
    pub seq: i64,
    pub buyer_id: String,
    pub party: String,
    pub amount_cents: i64,
    pub status: String,
    pub message: String,
    pub created_at: i64,
}

impl OfferRow {
    /// Parse the stored strings back into the domain offer type.
    pub fn into_offer(self) -> Result<Offer, OfferError> {
        Ok(Offer {
            id: self.id,
            listing_id: self.listing_id,
            seq: self.seq,
            buyer_id: self.buyer_id,
            party: self.party.parse()?,
            amount_cents: self.amount_cents,
            status: self.status.parse()?,
            message: self.message,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autodeal_core::offer::{OfferParty, OfferStatus};

    #[test]
    fn offer_row_parses_into_domain_offer() {
        let row = OfferRow {
            id: 7,
            listing_id: "listing-1".to_string(),
            seq: 2,
            buyer_id: "buyer-1".to_string(),
            party: "seller".to_string(),
            amount_cents: 3_450_000,
            status: "pending".to_string(),
            message: "Counter offer".to_string(),
            created_at: 1_756_000_000,
        };
        let offer = row.into_offer().unwrap();
        assert_eq!(offer.party, OfferParty::Seller);
        assert_eq!(offer.status, OfferStatus::Pending);
        assert_eq!(offer.seq, 2);
    }

    #[test]
    fn corrupt_party_is_an_error() {
        let row = OfferRow {
            id: 1,
            listing_id: "l".to_string(),
            seq: 1,
            buyer_id: "b".to_string(),
            party: "dealer".to_string(),
            amount_cents: 100,
            status: "pending".to_string(),
            message: String::new(),
            created_at: 0,
        };
        assert!(row.into_offer().is_err());
    }

    #[test]
    fn malformed_features_degrade_to_empty() {
        let row = ListingRow {
            id: "l".to_string(),
            seller_id: "s".to_string(),
            title: "2021 BMW 3 Series".to_string(),
            price_cents: 3_500_000,
            year: 2021,
            mileage: 25_000,
            location: "Los Angeles, CA".to_string(),
            description: String::new(),
            features: "not-json".to_string(),
            created_at: 0,
        };
        assert!(row.feature_list().is_empty());
    }
}
