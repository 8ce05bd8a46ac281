//! 2Factor.in SMS OTP client.
//!
//! Uses reqwest to call the provider's send and verify endpoints. The
//! provider answers every request with `{ "Status": ..., "Details": ... }`;
//! anything other than a success status is surfaced as a generic delivery
//! failure to the caller.

use std::sync::LazyLock;
use std::time::Duration;

use rand::RngExt;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use autodeal_core::config::SmsConfig;

/// OTP client errors.
#[derive(Debug, Error)]
pub enum OtpError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OTP delivery failed: {0}")]
    Upstream(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Upstream response envelope shared by the send and verify endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct ProviderResponse {
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Details", default)]
    pub details: String,
}

impl ProviderResponse {
    pub(crate) fn is_success(&self) -> bool {
        self.status == "Success"
    }

    /// A verify response only counts when the provider confirms the match.
    pub(crate) fn otp_matched(&self) -> bool {
        self.is_success() && self.details == "OTP Matched"
    }
}

/// Generate a 6-digit one-time code.
pub fn generate_code() -> String {
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

#[allow(clippy::missing_panics_doc, clippy::expect_used)]
fn phone_regex() -> &'static Regex {
    static PHONE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\+?[0-9]{7,15}$").expect("static regex pattern is valid")
    });
    &PHONE
}

/// Validate the shape of a phone number before it reaches the provider.
pub fn validate_phone(phone: &str) -> Result<(), OtpError> {
    if phone_regex().is_match(phone) {
        Ok(())
    } else {
        Err(OtpError::InvalidPhone(phone.to_string()))
    }
}

/// 2Factor.in SMS API client.
#[derive(Debug)]
pub struct TwoFactorClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    template: String,
}

impl TwoFactorClient {
    /// Create a new client from the SMS configuration.
    ///
    /// Returns a configuration error when no API key is present.
    pub fn new(config: &SmsConfig) -> Result<Self, OtpError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| OtpError::Config("SMS API key not configured".into()))?;

        // Ensure a TLS crypto provider is installed (reqwest uses rustls-no-provider).
        // The `Err` case just means it was already installed — safe to ignore.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            template: config.template.clone(),
        })
    }

    /// Send a one-time code to a phone number.
    ///
    /// Returns the provider's verification session id, which the caller
    /// passes back to [`TwoFactorClient::verify`].
    pub async fn send(&self, phone: &str, code: &str) -> Result<String, OtpError> {
        validate_phone(phone)?;

        let url = format!(
            "{}/API/V1/{}/SMS/{}/{}/{}",
            self.base_url, self.api_key, phone, code, self.template
        );

        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(OtpError::Upstream(format!(
                "provider returned HTTP {status}"
            )));
        }

        let body: ProviderResponse = resp.json().await?;
        if body.is_success() {
            Ok(body.details)
        } else {
            Err(OtpError::Upstream(body.details))
        }
    }

    /// Verify a code against a previously opened session.
    ///
    /// Returns `false` for a well-formed rejection (wrong code); transport
    /// and provider failures are errors.
    pub async fn verify(&self, session_id: &str, code: &str) -> Result<bool, OtpError> {
        let url = format!(
            "{}/API/V1/{}/SMS/VERIFY/{}/{}",
            self.base_url, self.api_key, session_id, code
        );

        let resp = self.http.get(&url).send().await?;
        let status = resp.status();

        // The provider answers a wrong code with a 400 and an Error status;
        // both shapes mean "not verified" rather than a hard failure.
        if !status.is_success() && status != reqwest::StatusCode::BAD_REQUEST {
            return Err(OtpError::Upstream(format!(
                "provider returned HTTP {status}"
            )));
        }

        let body: ProviderResponse = resp.json().await?;
        Ok(body.otp_matched())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(code.as_bytes()[0], b'0');
        }
    }

    #[test]
    fn phone_validation() {
        assert!(validate_phone("+15551234567").is_ok());
        assert!(validate_phone("15551234567").is_ok());
        assert!(validate_phone("1234567").is_ok());

        assert!(validate_phone("").is_err());
        assert!(validate_phone("+1 555 123").is_err());
        assert!(validate_phone("phone").is_err());
        assert!(validate_phone("+123456").is_err());
    }

    #[test]
    fn send_response_parsing() {
        let ok: ProviderResponse =
            serde_json::from_str(r#"{"Status":"Success","Details":"session-abc123"}"#).unwrap();
        assert!(ok.is_success());
        assert_eq!(ok.details, "session-abc123");

        let err: ProviderResponse =
            serde_json::from_str(r#"{"Status":"Error","Details":"Invalid phone"}"#).unwrap();
        assert!(!err.is_success());
    }

    #[test]
    fn verify_response_requires_matched_details() {
        let matched: ProviderResponse =
            serde_json::from_str(r#"{"Status":"Success","Details":"OTP Matched"}"#).unwrap();
        assert!(matched.otp_matched());

        let mismatch: ProviderResponse =
            serde_json::from_str(r#"{"Status":"Error","Details":"OTP Mismatch"}"#).unwrap();
        assert!(!mismatch.otp_matched());

        // Success status without the matched detail is still a rejection.
        let odd: ProviderResponse =
            serde_json::from_str(r#"{"Status":"Success","Details":"OTP Expired"}"#).unwrap();
        assert!(!odd.otp_matched());
    }

    #[test]
    fn client_requires_an_api_key() {
        let config = SmsConfig::default();
        assert!(matches!(
            TwoFactorClient::new(&config),
            Err(OtpError::Config(_))
        ));

        let config = SmsConfig {
            api_key: Some("key-123".to_string()),
            ..SmsConfig::default()
        };
        assert!(TwoFactorClient::new(&config).is_ok());
    }
}
