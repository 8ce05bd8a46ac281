//! Conversions between domain/storage types and proto messages.

use autodeal_core::offer::{ListingStatus, Offer, OfferParty, OfferStatus};
use autodeal_proto::v1 as pb;

use crate::storage::ListingRow;

/// Unix seconds to a proto timestamp.
pub(crate) const fn timestamp(secs: i64) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: secs,
        nanos: 0,
    }
}

pub(crate) const fn party_to_proto(party: OfferParty) -> pb::OfferParty {
    match party {
        OfferParty::Buyer => pb::OfferParty::Buyer,
        OfferParty::Seller => pb::OfferParty::Seller,
    }
}

/// Decode a proto party; `Unspecified` and unknown values are `None`.
pub(crate) fn party_from_proto(value: i32) -> Option<OfferParty> {
    match pb::OfferParty::try_from(value).ok()? {
        pb::OfferParty::Buyer => Some(OfferParty::Buyer),
        pb::OfferParty::Seller => Some(OfferParty::Seller),
        pb::OfferParty::Unspecified => None,
    }
}

pub(crate) const fn status_to_proto(status: OfferStatus) -> pb::OfferStatus {
    match status {
        OfferStatus::Pending => pb::OfferStatus::Pending,
        OfferStatus::Accepted => pb::OfferStatus::Accepted,
        OfferStatus::Declined => pb::OfferStatus::Declined,
    }
}

pub(crate) const fn listing_status_to_proto(status: ListingStatus) -> pb::ListingStatus {
    match status {
        ListingStatus::Available => pb::ListingStatus::Available,
        ListingStatus::Negotiating => pb::ListingStatus::Negotiating,
    }
}

/// Convert a domain offer into its proto representation.
pub(crate) fn offer_to_proto(offer: Offer) -> pb::Offer {
    pb::Offer {
        id: offer.id,
        listing_id: offer.listing_id,
        seq: offer.seq,
        buyer_id: offer.buyer_id,
        party: party_to_proto(offer.party).into(),
        amount_cents: offer.amount_cents,
        status: status_to_proto(offer.status).into(),
        message: offer.message,
        created_at: Some(timestamp(offer.created_at)),
    }
}

/// Convert a listing row plus its derived status into a proto listing.
pub(crate) fn listing_to_proto(row: ListingRow, status: ListingStatus) -> pb::Listing {
    let features = row.feature_list();
    pb::Listing {
        id: row.id,
        seller_id: row.seller_id,
        title: row.title,
        price_cents: row.price_cents,
        year: u32::try_from(row.year).unwrap_or_default(),
        mileage: u32::try_from(row.mileage).unwrap_or_default(),
        location: row.location,
        description: row.description,
        features,
        status: listing_status_to_proto(status).into(),
        created_at: Some(timestamp(row.created_at)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn party_roundtrip() {
        assert_eq!(
            party_from_proto(pb::OfferParty::Buyer.into()),
            Some(OfferParty::Buyer)
        );
        assert_eq!(
            party_from_proto(pb::OfferParty::Seller.into()),
            Some(OfferParty::Seller)
        );
        assert_eq!(party_from_proto(0), None);
        assert_eq!(party_from_proto(99), None);
    }

    #[test]
    fn offer_to_proto_maps_enums_and_timestamp() {
        let offer = Offer {
            id: 3,
            listing_id: "listing-1".to_string(),
            seq: 1,
            buyer_id: "buyer-1".to_string(),
            party: OfferParty::Buyer,
            amount_cents: 3_300_000,
            status: OfferStatus::Declined,
            message: "Initial offer".to_string(),
            created_at: 1_756_000_000,
        };
        let proto = offer_to_proto(offer);
        assert_eq!(proto.status, i32::from(pb::OfferStatus::Declined));
        assert_eq!(proto.party, i32::from(pb::OfferParty::Buyer));
        assert_eq!(proto.created_at.unwrap().seconds, 1_756_000_000);
    }
}
