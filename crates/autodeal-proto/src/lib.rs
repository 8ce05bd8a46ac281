//! AutoDeal Protocol Buffers
//!
//! Generated protobuf code for the AutoDeal gRPC API.
//!
//! This crate contains:
//! - `ListingService` for the car catalogue
//! - `NegotiationService` for the per-listing offer ledger
//! - `ProfileService` for profile fetch and contact disclosure
//! - `AuthService` for phone-OTP sign-in
//! - `Health` services for health checking

#![allow(clippy::derive_partial_eq_without_eq)]

/// AutoDeal v1 API definitions.
///
/// All generated types and services are included here.
pub mod v1 {
    tonic::include_proto!("autodeal.v1");
}

// Re-export v1 as the default API version for convenience
pub use v1::*;

// Re-export prost_types for downstream crates that need Timestamp conversion
pub use prost_types;
