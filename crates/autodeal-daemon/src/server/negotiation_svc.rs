//! NegotiationService gRPC implementation.

use tonic::{Request, Response, Status};

use autodeal_core::offer::OfferError;
use autodeal_proto::v1::{
    CounterOfferRequest, ListOffersRequest, ListOffersResponse, Offer, OfferDecisionRequest,
    SubmitOfferRequest, negotiation_service_server::NegotiationService,
};

use crate::negotiation::{NegotiationError, OfferLedger};

use super::convert::{offer_to_proto, party_from_proto};

/// NegotiationService implementation backed by the offer ledger.
pub struct NegotiationServiceImpl {
    ledger: OfferLedger,
}

impl NegotiationServiceImpl {
    /// Create a new NegotiationService.
    pub const fn new(ledger: OfferLedger) -> Self {
        Self { ledger }
    }
}

/// Map ledger errors onto gRPC status codes.
fn to_status(err: NegotiationError) -> Status {
    match &err {
        NegotiationError::Offer(OfferError::InvalidAmount(_)) => {
            Status::invalid_argument(err.to_string())
        }
        NegotiationError::Offer(OfferError::InvalidTransition(_)) => {
            Status::failed_precondition(err.to_string())
        }
        NegotiationError::ListingNotFound(_) | NegotiationError::OfferNotFound(_) => {
            Status::not_found(err.to_string())
        }
        NegotiationError::Offer(OfferError::UnknownValue { .. })
        | NegotiationError::Database(_) => Status::internal(err.to_string()),
    }
}

fn required_party(value: i32) -> Result<autodeal_core::offer::OfferParty, Status> {
    party_from_proto(value).ok_or_else(|| Status::invalid_argument("offer party must be specified"))
}

#[tonic::async_trait]
impl NegotiationService for NegotiationServiceImpl {
    async fn submit_offer(
        &self,
        request: Request<SubmitOfferRequest>,
    ) -> Result<Response<Offer>, Status> {
        let req = request.into_inner();
        let party = required_party(req.party)?;

        if req.buyer_id.is_empty() {
            return Err(Status::invalid_argument("buyer_id must not be empty"));
        }

        let offer = self
            .ledger
            .submit_offer(
                &req.listing_id,
                &req.buyer_id,
                party,
                req.amount_cents,
                &req.message,
            )
            .await
            .map_err(to_status)?;

        Ok(Response::new(offer_to_proto(offer)))
    }

    async fn accept_offer(
        &self,
        request: Request<OfferDecisionRequest>,
    ) -> Result<Response<Offer>, Status> {
        let req = request.into_inner();
        let offer = self.ledger.accept(req.offer_id).await.map_err(to_status)?;
        Ok(Response::new(offer_to_proto(offer)))
    }

    async fn decline_offer(
        &self,
        request: Request<OfferDecisionRequest>,
    ) -> Result<Response<Offer>, Status> {
        let req = request.into_inner();
        let offer = self.ledger.decline(req.offer_id).await.map_err(to_status)?;
        Ok(Response::new(offer_to_proto(offer)))
    }

    async fn counter_offer(
        &self,
        request: Request<CounterOfferRequest>,
    ) -> Result<Response<Offer>, Status> {
        let req = request.into_inner();
        let party = required_party(req.party)?;

        if req.buyer_id.is_empty() {
            return Err(Status::invalid_argument("buyer_id must not be empty"));
        }

        let offer = self
            .ledger
            .counter(
                &req.listing_id,
                &req.buyer_id,
                party,
                req.amount_cents,
                &req.message,
            )
            .await
            .map_err(to_status)?;

        Ok(Response::new(offer_to_proto(offer)))
    }

    async fn list_offers(
        &self,
        request: Request<ListOffersRequest>,
    ) -> Result<Response<ListOffersResponse>, Status> {
        let req = request.into_inner();
        let offers = self
            .ledger
            .offers(&req.listing_id)
            .await
            .map_err(to_status)?;

        Ok(Response::new(ListOffersResponse {
            offers: offers.into_iter().map(offer_to_proto).collect(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Database, NewListing};
    use autodeal_proto::v1::{OfferParty as PbParty, OfferStatus as PbStatus};

    async fn test_service() -> NegotiationServiceImpl {
        let db = Database::open_in_memory().await.unwrap();
        db.create_profile("seller-1", "Jane Seller", "+15550000001")
            .await
            .unwrap();
        db.create_profile("buyer-1", "John D.", "+15550000002")
            .await
            .unwrap();
        db.create_listing(&NewListing {
            id: "listing-1".to_string(),
            seller_id: "seller-1".to_string(),
            title: "2019 Mercedes C-Class".to_string(),
            price_cents: 3_800_000,
            year: 2019,
            mileage: 32_000,
            location: "Miami, FL".to_string(),
            description: String::new(),
            features: vec![],
        })
        .await
        .unwrap();
        NegotiationServiceImpl::new(OfferLedger::new(db))
    }

    fn submit(amount_cents: i64) -> SubmitOfferRequest {
        SubmitOfferRequest {
            listing_id: "listing-1".to_string(),
            buyer_id: "buyer-1".to_string(),
            party: PbParty::Buyer.into(),
            amount_cents,
            message: "Your offer".to_string(),
        }
    }

    #[tokio::test]
    async fn submit_and_list() {
        let svc = test_service().await;
        let offer = svc
            .submit_offer(Request::new(submit(3_300_000)))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(offer.status, i32::from(PbStatus::Pending));
        assert_eq!(offer.seq, 1);

        let offers = svc
            .list_offers(Request::new(ListOffersRequest {
                listing_id: "listing-1".to_string(),
            }))
            .await
            .unwrap()
            .into_inner()
            .offers;
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].id, offer.id);
    }

    #[tokio::test]
    async fn non_positive_amount_is_invalid_argument() {
        let svc = test_service().await;
        let result = svc.submit_offer(Request::new(submit(0))).await;
        assert_eq!(result.unwrap_err().code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn unspecified_party_is_invalid_argument() {
        let svc = test_service().await;
        let result = svc
            .submit_offer(Request::new(SubmitOfferRequest {
                party: 0,
                ..submit(3_300_000)
            }))
            .await;
        assert_eq!(result.unwrap_err().code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn double_decision_is_failed_precondition() {
        let svc = test_service().await;
        let offer = svc
            .submit_offer(Request::new(submit(3_300_000)))
            .await
            .unwrap()
            .into_inner();

        let accepted = svc
            .accept_offer(Request::new(OfferDecisionRequest { offer_id: offer.id }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(accepted.status, i32::from(PbStatus::Accepted));

        let result = svc
            .decline_offer(Request::new(OfferDecisionRequest { offer_id: offer.id }))
            .await;
        assert_eq!(result.unwrap_err().code(), tonic::Code::FailedPrecondition);
    }

    #[tokio::test]
    async fn decision_on_missing_offer_is_not_found() {
        let svc = test_service().await;
        let result = svc
            .accept_offer(Request::new(OfferDecisionRequest { offer_id: 404 }))
            .await;
        assert_eq!(result.unwrap_err().code(), tonic::Code::NotFound);
    }

    #[tokio::test]
    async fn counter_appends_without_closing() {
        let svc = test_service().await;
        let first = svc
            .submit_offer(Request::new(submit(3_300_000)))
            .await
            .unwrap()
            .into_inner();

        let counter = svc
            .counter_offer(Request::new(CounterOfferRequest {
                listing_id: "listing-1".to_string(),
                buyer_id: "buyer-1".to_string(),
                party: PbParty::Seller.into(),
                amount_cents: 3_450_000,
                message: "Counter offer".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(counter.party, i32::from(PbParty::Seller));
        assert_eq!(counter.seq, 2);

        let offers = svc
            .list_offers(Request::new(ListOffersRequest {
                listing_id: "listing-1".to_string(),
            }))
            .await
            .unwrap()
            .into_inner()
            .offers;
        assert_eq!(offers.len(), 2);
        assert!(
            offers
                .iter()
                .all(|o| o.status == i32::from(PbStatus::Pending))
        );
        assert!(offers.iter().any(|o| o.id == first.id));
    }
}
