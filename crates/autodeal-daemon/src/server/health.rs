//! Health service gRPC implementations.
//!
//! Implements both the standard gRPC Health service (compatible with
//! grpc.health.v1) and the AutoDeal-specific health details service.

use std::pin::Pin;

use tokio_stream::Stream;
use tonic::{Request, Response, Status};

use autodeal_proto::v1::{
    ComponentHealth, HealthCheckRequest, HealthCheckResponse, HealthDetailsRequest,
    HealthDetailsResponse, ServingStatus, auto_deal_health_server::AutoDealHealth,
    health_server::Health,
};

use crate::storage::Database;

/// Health service implementation.
#[derive(Clone)]
pub struct HealthServiceImpl {
    db: Database,
    sms_configured: bool,
}

impl HealthServiceImpl {
    /// Create a new health service.
    pub const fn new(db: Database, sms_configured: bool) -> Self {
        Self { db, sms_configured }
    }

    /// Check if the database is healthy by running a simple query.
    async fn check_db_health(&self) -> ComponentHealth {
        let status = match self.db.list_listings(1, 0).await {
            Ok(_) => ServingStatus::Serving,
            Err(_) => ServingStatus::NotServing,
        };

        ComponentHealth {
            name: "database".to_string(),
            status: status.into(),
            message: match status {
                ServingStatus::Serving => "SQLite database operational".to_string(),
                _ => "Database query failed".to_string(),
            },
            last_check: Some(prost_types::Timestamp::from(std::time::SystemTime::now())),
        }
    }

    /// Check the SMS upstream configuration.
    fn check_sms_health(&self) -> ComponentHealth {
        let (status, message) = if self.sms_configured {
            (ServingStatus::Serving, "SMS provider configured".to_string())
        } else {
            (
                ServingStatus::NotServing,
                "SMS API key not configured; OTP auth disabled".to_string(),
            )
        };

        ComponentHealth {
            name: "sms_provider".to_string(),
            status: status.into(),
            message,
            last_check: Some(prost_types::Timestamp::from(std::time::SystemTime::now())),
        }
    }
}

fn is_known_service(service: &str) -> bool {
    service.is_empty() || service.starts_with("autodeal.v1.")
}

#[tonic::async_trait]
impl Health for HealthServiceImpl {
    type WatchStream =
        Pin<Box<dyn Stream<Item = Result<HealthCheckResponse, Status>> + Send + 'static>>;

    async fn check(
        &self,
        request: Request<HealthCheckRequest>,
    ) -> Result<Response<HealthCheckResponse>, Status> {
        let service = request.into_inner().service;

        // Empty service name means overall health
        let status = if is_known_service(&service) {
            // Quick DB probe to confirm we're serving
            match self.db.list_listings(1, 0).await {
                Ok(_) => ServingStatus::Serving,
                Err(_) => ServingStatus::NotServing,
            }
        } else {
            ServingStatus::ServiceUnknown
        };

        Ok(Response::new(HealthCheckResponse {
            status: status.into(),
        }))
    }

    async fn watch(
        &self,
        request: Request<HealthCheckRequest>,
    ) -> Result<Response<Self::WatchStream>, Status> {
        let service = request.into_inner().service;
        let db = self.db.clone();

        let stream = async_stream::stream! {
            loop {
                let status = if is_known_service(&service) {
                    match db.list_listings(1, 0).await {
                        Ok(_) => ServingStatus::Serving,
                        Err(_) => ServingStatus::NotServing,
                    }
                } else {
                    ServingStatus::ServiceUnknown
                };

                yield Ok(HealthCheckResponse {
                    status: status.into(),
                });

                tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
            }
        };

        Ok(Response::new(Box::pin(stream)))
    }
}

#[tonic::async_trait]
impl AutoDealHealth for HealthServiceImpl {
    async fn get_health_details(
        &self,
        _request: Request<HealthDetailsRequest>,
    ) -> Result<Response<HealthDetailsResponse>, Status> {
        let db_health = self.check_db_health().await;
        let sms_health = self.check_sms_health();

        let components = vec![db_health, sms_health];

        // Overall status: SERVING if all components are SERVING
        let overall = if components
            .iter()
            .all(|c| c.status == ServingStatus::Serving as i32)
        {
            ServingStatus::Serving
        } else {
            ServingStatus::NotServing
        };

        let degraded = components
            .iter()
            .any(|c| c.status != ServingStatus::Serving as i32);
        let degraded_reason = if degraded {
            components
                .iter()
                .filter(|c| c.status != ServingStatus::Serving as i32)
                .map(|c| format!("{}: {}", c.name, c.message))
                .collect::<Vec<_>>()
                .join("; ")
        } else {
            String::new()
        };

        let mut metadata = std::collections::HashMap::new();
        metadata.insert("version".to_string(), env!("CARGO_PKG_VERSION").to_string());

        Ok(Response::new(HealthDetailsResponse {
            overall_status: overall.into(),
            components,
            metadata,
            degraded,
            degraded_reason,
        }))
    }
}
