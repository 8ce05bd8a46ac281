//! `AutoDeal` Core Library
//!
//! Shared functionality for `AutoDeal` components:
//! - Offer domain types and the per-offer state machine
//! - Contact disclosure rules
//! - Configuration resolution and hierarchy
//! - Database pool helpers and common error types

pub mod config;
pub mod db;
pub mod disclosure;
pub mod error;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod offer;
pub mod tracing_init;

pub use config::Config;
pub use disclosure::{ContactCard, ContactProfile};
pub use error::{Error, Result};
pub use offer::{Offer, OfferError, OfferParty, OfferStatus};
