//! gRPC server for the AutoDeal daemon.
//!
//! Wires the storage-backed managers into the tonic services and serves
//! them over TCP.

mod auth_svc;
mod config;
mod convert;
mod health;
mod listing_svc;
mod negotiation_svc;
mod profile_svc;

pub use auth_svc::AuthServiceImpl;
pub use config::ServerConfig;
pub use health::HealthServiceImpl;
pub use listing_svc::ListingServiceImpl;
pub use negotiation_svc::NegotiationServiceImpl;
pub use profile_svc::ProfileServiceImpl;

use std::time::Duration;

use thiserror::Error;
use tonic::transport::Server;
use tracing::info;

use autodeal_core::config::SmsConfig;
use autodeal_proto::v1::auth_service_server::AuthServiceServer;
use autodeal_proto::v1::auto_deal_health_server::AutoDealHealthServer;
use autodeal_proto::v1::health_server::HealthServer;
use autodeal_proto::v1::listing_service_server::ListingServiceServer;
use autodeal_proto::v1::negotiation_service_server::NegotiationServiceServer;
use autodeal_proto::v1::profile_service_server::ProfileServiceServer;

use crate::contact::ContactGate;
use crate::negotiation::OfferLedger;
use crate::storage::Database;

/// Server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// gRPC server handle.
pub struct GrpcServer {
    config: ServerConfig,
    db: Database,
    sms: SmsConfig,
}

impl GrpcServer {
    /// Create a new gRPC server with all components wired together.
    pub const fn new(config: ServerConfig, db: Database, sms: SmsConfig) -> Self {
        Self { config, db, sms }
    }

    /// Get the server configuration.
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Start serving on the configured TCP address.
    pub async fn serve_tcp(self) -> Result<(), ServerError> {
        let addr = self.config.tcp_addr;

        let ledger = OfferLedger::new(self.db.clone());
        let listing_service = ListingServiceImpl::new(self.db.clone(), ledger.clone());
        let negotiation_service = NegotiationServiceImpl::new(ledger);
        let profile_service =
            ProfileServiceImpl::new(self.db.clone(), ContactGate::new(self.db.clone()));
        let auth_service = AuthServiceImpl::from_config(self.db.clone(), &self.sms);
        let health_service = HealthServiceImpl::new(self.db, self.sms.api_key.is_some());

        info!(%addr, "Starting gRPC server on TCP");

        Server::builder()
            .http2_keepalive_interval(Some(Duration::from_secs(30)))
            .http2_keepalive_timeout(Some(Duration::from_secs(10)))
            .add_service(ListingServiceServer::new(listing_service))
            .add_service(NegotiationServiceServer::new(negotiation_service))
            .add_service(ProfileServiceServer::new(profile_service))
            .add_service(AuthServiceServer::new(auth_service))
            .add_service(HealthServer::new(health_service.clone()))
            .add_service(AutoDealHealthServer::new(health_service))
            .serve(addr)
            .await?;

        Ok(())
    }
}
