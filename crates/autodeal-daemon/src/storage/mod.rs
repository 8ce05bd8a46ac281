//! `SQLite` storage for the `AutoDeal` daemon.
//!
//! Provides persistence for profiles, listings, and offer ledgers.

mod db;
mod models;
mod queries;

pub use db::{Database, DatabaseError};
pub use models::*;
pub use queries::NewListing;
