//! `AutoDeal` Daemon Library
//!
//! The daemon promotes the marketplace's negotiation logic to a real
//! backend: a gRPC API over `SQLite` storage covering listings, the
//! per-listing offer ledger, contact disclosure, and phone-OTP sign-in.

pub mod contact;
pub mod negotiation;
pub mod otp;
pub mod server;
pub mod storage;
