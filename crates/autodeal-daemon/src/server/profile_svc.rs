//! ProfileService gRPC implementation.
//!
//! `GetProfile` returns the raw stored profile; `GetContact` runs the
//! disclosure gate for a specific viewer and is the only path pages should
//! use to show someone else's contact details.

use tonic::{Request, Response, Status};

use autodeal_proto::v1::{
    ContactCard, GetContactRequest, GetProfileRequest, Profile,
    profile_service_server::ProfileService,
};

use crate::contact::{ContactError, ContactGate};
use crate::storage::{Database, DatabaseError};

/// ProfileService implementation backed by the contact gate.
pub struct ProfileServiceImpl {
    db: Database,
    gate: ContactGate,
}

impl ProfileServiceImpl {
    /// Create a new ProfileService.
    pub const fn new(db: Database, gate: ContactGate) -> Self {
        Self { db, gate }
    }
}

fn contact_status(err: ContactError) -> Status {
    match err {
        ContactError::ProfileNotFound(owner) => {
            Status::not_found(format!("Profile not found: {owner}"))
        }
        ContactError::Database(e) => Status::internal(e.to_string()),
    }
}

#[tonic::async_trait]
impl ProfileService for ProfileServiceImpl {
    async fn get_profile(
        &self,
        request: Request<GetProfileRequest>,
    ) -> Result<Response<Profile>, Status> {
        let req = request.into_inner();

        let row = self.db.get_profile(&req.id).await.map_err(|e| match e {
            DatabaseError::NotFound(msg) => Status::not_found(msg),
            other => Status::internal(other.to_string()),
        })?;

        Ok(Response::new(Profile {
            id: row.id,
            name: row.name,
            phone: row.phone,
        }))
    }

    async fn get_contact(
        &self,
        request: Request<GetContactRequest>,
    ) -> Result<Response<ContactCard>, Status> {
        let req = request.into_inner();
        let viewer = if req.viewer_id.is_empty() {
            None
        } else {
            Some(req.viewer_id.as_str())
        };

        let card = self
            .gate
            .resolve(&req.owner_id, viewer)
            .await
            .map_err(contact_status)?;

        Ok(Response::new(ContactCard {
            owner_id: card.owner_id,
            name: card.name,
            phone: card.phone,
            contact_visible: card.contact_visible,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autodeal_core::disclosure::{ANONYMOUS_NAME_MASK, HIDDEN_UNTIL_ACCEPTED};

    async fn test_service() -> ProfileServiceImpl {
        let db = Database::open_in_memory().await.unwrap();
        db.create_profile("seller-1", "Jane Seller", "+15550000001")
            .await
            .unwrap();
        db.create_profile("buyer-1", "John D.", "+15550000002")
            .await
            .unwrap();
        ProfileServiceImpl::new(db.clone(), ContactGate::new(db))
    }

    #[tokio::test]
    async fn get_profile_returns_raw_fields() {
        let svc = test_service().await;
        let profile = svc
            .get_profile(Request::new(GetProfileRequest {
                id: "seller-1".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(profile.name, "Jane Seller");
        assert_eq!(profile.phone, "+15550000001");
    }

    #[tokio::test]
    async fn get_profile_unknown_is_not_found() {
        let svc = test_service().await;
        let result = svc
            .get_profile(Request::new(GetProfileRequest {
                id: "ghost".to_string(),
            }))
            .await;
        assert_eq!(result.unwrap_err().code(), tonic::Code::NotFound);
    }

    #[tokio::test]
    async fn anonymous_contact_is_masked() {
        let svc = test_service().await;
        let card = svc
            .get_contact(Request::new(GetContactRequest {
                owner_id: "seller-1".to_string(),
                viewer_id: String::new(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(!card.contact_visible);
        assert_eq!(card.name, ANONYMOUS_NAME_MASK);
    }

    #[tokio::test]
    async fn stranger_contact_is_hidden_until_accepted() {
        let svc = test_service().await;
        let card = svc
            .get_contact(Request::new(GetContactRequest {
                owner_id: "seller-1".to_string(),
                viewer_id: "buyer-1".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(!card.contact_visible);
        assert_eq!(card.name, HIDDEN_UNTIL_ACCEPTED);
        assert_eq!(card.phone, HIDDEN_UNTIL_ACCEPTED);
    }

    #[tokio::test]
    async fn unknown_owner_is_not_found() {
        let svc = test_service().await;
        let result = svc
            .get_contact(Request::new(GetContactRequest {
                owner_id: "ghost".to_string(),
                viewer_id: "buyer-1".to_string(),
            }))
            .await;
        assert_eq!(result.unwrap_err().code(), tonic::Code::NotFound);
    }
}
