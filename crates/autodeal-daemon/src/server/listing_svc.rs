//! ListingService gRPC implementation.

use tonic::{Request, Response, Status};
use tracing::info;
use uuid::Uuid;

use autodeal_proto::v1::{
    CreateListingRequest, GetListingRequest, ListListingsRequest, ListListingsResponse, Listing,
    listing_service_server::ListingService,
};

use crate::negotiation::OfferLedger;
use crate::storage::{Database, DatabaseError, NewListing};

use super::convert::listing_to_proto;

const DEFAULT_PAGE_SIZE: u32 = 50;
const MAX_PAGE_SIZE: u32 = 200;

/// ListingService implementation backed by the database and offer ledger.
pub struct ListingServiceImpl {
    db: Database,
    ledger: OfferLedger,
}

impl ListingServiceImpl {
    /// Create a new ListingService.
    pub const fn new(db: Database, ledger: OfferLedger) -> Self {
        Self { db, ledger }
    }
}

fn db_status(err: DatabaseError) -> Status {
    match err {
        DatabaseError::NotFound(msg) => Status::not_found(msg),
        other => Status::internal(other.to_string()),
    }
}

#[tonic::async_trait]
impl ListingService for ListingServiceImpl {
    async fn create_listing(
        &self,
        request: Request<CreateListingRequest>,
    ) -> Result<Response<Listing>, Status> {
        let req = request.into_inner();

        if req.title.trim().is_empty() {
            return Err(Status::invalid_argument("listing title must not be empty"));
        }
        if req.price_cents <= 0 {
            return Err(Status::invalid_argument("listing price must be positive"));
        }

        // The seller must exist before anything can reference them.
        self.db
            .get_profile(&req.seller_id)
            .await
            .map_err(db_status)?;

        let listing = self
            .db
            .create_listing(&NewListing {
                id: Uuid::new_v4().to_string(),
                seller_id: req.seller_id,
                title: req.title,
                price_cents: req.price_cents,
                year: i64::from(req.year),
                mileage: i64::from(req.mileage),
                location: req.location,
                description: req.description,
                features: req.features,
            })
            .await
            .map_err(db_status)?;

        info!(id = %listing.id, seller_id = %listing.seller_id, "Listing created");

        // A fresh listing has no offers, so it is trivially available.
        let status = self
            .ledger
            .listing_status(&listing.id)
            .await
            .map_err(|e| Status::internal(e.to_string()))?;

        Ok(Response::new(listing_to_proto(listing, status)))
    }

    async fn get_listing(
        &self,
        request: Request<GetListingRequest>,
    ) -> Result<Response<Listing>, Status> {
        let req = request.into_inner();

        let listing = self.db.get_listing(&req.id).await.map_err(db_status)?;
        let status = self
            .ledger
            .listing_status(&listing.id)
            .await
            .map_err(|e| Status::internal(e.to_string()))?;

        Ok(Response::new(listing_to_proto(listing, status)))
    }

    async fn list_listings(
        &self,
        request: Request<ListListingsRequest>,
    ) -> Result<Response<ListListingsResponse>, Status> {
        let req = request.into_inner();
        let limit = if req.limit == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            req.limit.min(MAX_PAGE_SIZE)
        };

        let rows = self
            .db
            .list_listings(limit, req.offset)
            .await
            .map_err(db_status)?;

        let mut listings = Vec::with_capacity(rows.len());
        for row in rows {
            let status = self
                .ledger
                .listing_status(&row.id)
                .await
                .map_err(|e| Status::internal(e.to_string()))?;
            listings.push(listing_to_proto(row, status));
        }

        Ok(Response::new(ListListingsResponse { listings }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autodeal_core::offer::OfferParty;
    use autodeal_proto::v1::ListingStatus as PbListingStatus;

    async fn test_service() -> (ListingServiceImpl, Database) {
        let db = Database::open_in_memory().await.unwrap();
        db.create_profile("seller-1", "Jane Seller", "+15550000001")
            .await
            .unwrap();
        db.create_profile("buyer-1", "John D.", "+15550000002")
            .await
            .unwrap();
        let svc = ListingServiceImpl::new(db.clone(), OfferLedger::new(db.clone()));
        (svc, db)
    }

    fn create_request() -> CreateListingRequest {
        CreateListingRequest {
            seller_id: "seller-1".to_string(),
            title: "2021 BMW 3 Series".to_string(),
            price_cents: 3_500_000,
            year: 2021,
            mileage: 25_000,
            location: "Los Angeles, CA".to_string(),
            description: "Well maintained".to_string(),
            features: vec!["Sunroof".to_string()],
        }
    }

    #[tokio::test]
    async fn create_then_get_roundtrip() {
        let (svc, _db) = test_service().await;
        let created = svc
            .create_listing(Request::new(create_request()))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(created.status, i32::from(PbListingStatus::Available));

        let fetched = svc
            .get_listing(Request::new(GetListingRequest {
                id: created.id.clone(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(fetched.title, "2021 BMW 3 Series");
        assert_eq!(fetched.features, vec!["Sunroof".to_string()]);
    }

    #[tokio::test]
    async fn unknown_seller_is_rejected() {
        let (svc, _db) = test_service().await;
        let result = svc
            .create_listing(Request::new(CreateListingRequest {
                seller_id: "ghost".to_string(),
                ..create_request()
            }))
            .await;
        assert_eq!(result.unwrap_err().code(), tonic::Code::NotFound);
    }

    #[tokio::test]
    async fn empty_title_is_invalid() {
        let (svc, _db) = test_service().await;
        let result = svc
            .create_listing(Request::new(CreateListingRequest {
                title: "  ".to_string(),
                ..create_request()
            }))
            .await;
        assert_eq!(result.unwrap_err().code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn get_nonexistent_returns_not_found() {
        let (svc, _db) = test_service().await;
        let result = svc
            .get_listing(Request::new(GetListingRequest {
                id: "nope".to_string(),
            }))
            .await;
        assert_eq!(result.unwrap_err().code(), tonic::Code::NotFound);
    }

    #[tokio::test]
    async fn pending_offer_marks_listing_negotiating() {
        let (svc, db) = test_service().await;
        let created = svc
            .create_listing(Request::new(create_request()))
            .await
            .unwrap()
            .into_inner();

        db.insert_offer(&created.id, "buyer-1", OfferParty::Buyer, 3_300_000, "")
            .await
            .unwrap();

        let fetched = svc
            .get_listing(Request::new(GetListingRequest { id: created.id }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(fetched.status, i32::from(PbListingStatus::Negotiating));
    }
}
