//! Phone-OTP delivery and verification.
//!
//! Provides a reqwest-based client for the 2Factor.in SMS API, plus code
//! generation and phone-number validation used by the auth service.

mod client;

pub use client::{OtpError, TwoFactorClient, generate_code, validate_phone};
