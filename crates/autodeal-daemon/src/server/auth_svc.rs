//! AuthService gRPC implementation.
//!
//! Wraps the SMS upstream client: `SendOtp` opens a verification session
//! with the provider, `VerifyOtp` checks the code and, for sign-ups,
//! creates the user's profile.

use tonic::{Request, Response, Status};
use tracing::{info, warn};
use uuid::Uuid;

use autodeal_core::config::SmsConfig;
use autodeal_proto::v1::{
    SendOtpRequest, SendOtpResponse, VerifyOtpRequest, VerifyOtpResponse,
    auth_service_server::AuthService,
};

use crate::otp::{OtpError, TwoFactorClient, generate_code, validate_phone};
use crate::storage::Database;

/// AuthService implementation backed by the SMS upstream.
pub struct AuthServiceImpl {
    db: Database,
    client: Option<TwoFactorClient>,
}

impl AuthServiceImpl {
    /// Create a new AuthService; `client` is `None` when OTP delivery is
    /// unconfigured, in which case the RPCs fail with `FailedPrecondition`.
    pub const fn new(db: Database, client: Option<TwoFactorClient>) -> Self {
        Self { db, client }
    }

    /// Build an AuthService from SMS configuration.
    pub fn from_config(db: Database, sms: &SmsConfig) -> Self {
        match TwoFactorClient::new(sms) {
            Ok(client) => Self::new(db, Some(client)),
            Err(e) => {
                warn!(error = %e, "SMS provider not configured; OTP auth disabled");
                Self::new(db, None)
            }
        }
    }

    fn client(&self) -> Result<&TwoFactorClient, Status> {
        self.client
            .as_ref()
            .ok_or_else(|| Status::failed_precondition("SMS provider not configured"))
    }
}

/// Map OTP client errors onto gRPC status codes.
fn otp_status(err: OtpError) -> Status {
    match &err {
        OtpError::InvalidPhone(_) => Status::invalid_argument(err.to_string()),
        OtpError::Config(_) => Status::failed_precondition(err.to_string()),
        OtpError::Http(_) | OtpError::Upstream(_) => Status::unavailable(err.to_string()),
    }
}

/// Find or create the profile for a verified phone number.
pub(crate) async fn ensure_profile(
    db: &Database,
    name: &str,
    phone: &str,
) -> Result<String, Status> {
    if let Some(existing) = db
        .find_profile_by_phone(phone)
        .await
        .map_err(|e| Status::internal(e.to_string()))?
    {
        return Ok(existing.id);
    }

    let id = Uuid::new_v4().to_string();
    db.create_profile(&id, name, phone)
        .await
        .map_err(|e| Status::internal(e.to_string()))?;

    info!(user_id = %id, "Profile created via OTP sign-up");

    Ok(id)
}

#[tonic::async_trait]
impl AuthService for AuthServiceImpl {
    async fn send_otp(
        &self,
        request: Request<SendOtpRequest>,
    ) -> Result<Response<SendOtpResponse>, Status> {
        let req = request.into_inner();
        let client = self.client()?;

        validate_phone(&req.phone).map_err(otp_status)?;

        let code = if req.code.is_empty() {
            generate_code()
        } else {
            if req.code.len() != 6 || !req.code.chars().all(|c| c.is_ascii_digit()) {
                return Err(Status::invalid_argument("code must be 6 digits"));
            }
            req.code
        };

        let session_id = client.send(&req.phone, &code).await.map_err(otp_status)?;

        info!("OTP sent");

        Ok(Response::new(SendOtpResponse { session_id }))
    }

    async fn verify_otp(
        &self,
        request: Request<VerifyOtpRequest>,
    ) -> Result<Response<VerifyOtpResponse>, Status> {
        let req = request.into_inner();
        let client = self.client()?;

        let verified = client
            .verify(&req.session_id, &req.code)
            .await
            .map_err(otp_status)?;

        if !verified {
            return Ok(Response::new(VerifyOtpResponse {
                verified: false,
                user_id: String::new(),
            }));
        }

        // Sign-up: a verified phone plus a name creates the profile.
        let user_id = if req.name.is_empty() {
            match req.phone.as_str() {
                "" => String::new(),
                phone => self
                    .db
                    .find_profile_by_phone(phone)
                    .await
                    .map_err(|e| Status::internal(e.to_string()))?
                    .map(|p| p.id)
                    .unwrap_or_default(),
            }
        } else {
            if req.phone.is_empty() {
                return Err(Status::invalid_argument("phone is required for sign-up"));
            }
            ensure_profile(&self.db, &req.name, &req.phone).await?
        };

        Ok(Response::new(VerifyOtpResponse {
            verified: true,
            user_id,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn rpcs_fail_without_a_configured_provider() {
        let svc = AuthServiceImpl::new(test_db().await, None);

        let result = svc
            .send_otp(Request::new(SendOtpRequest {
                phone: "+15551234567".to_string(),
                code: String::new(),
            }))
            .await;
        assert_eq!(result.unwrap_err().code(), tonic::Code::FailedPrecondition);

        let result = svc
            .verify_otp(Request::new(VerifyOtpRequest {
                session_id: "s".to_string(),
                code: "123456".to_string(),
                phone: String::new(),
                name: String::new(),
            }))
            .await;
        assert_eq!(result.unwrap_err().code(), tonic::Code::FailedPrecondition);
    }

    #[tokio::test]
    async fn from_config_without_key_disables_otp() {
        let svc = AuthServiceImpl::from_config(test_db().await, &SmsConfig::default());
        assert!(svc.client.is_none());
    }

    #[tokio::test]
    async fn ensure_profile_is_idempotent_per_phone() {
        let db = test_db().await;

        let first = ensure_profile(&db, "John D.", "+15550000002").await.unwrap();
        let second = ensure_profile(&db, "John David", "+15550000002")
            .await
            .unwrap();
        assert_eq!(first, second);

        let profile = db.get_profile(&first).await.unwrap();
        // The original sign-up name wins.
        assert_eq!(profile.name, "John D.");
    }
}
