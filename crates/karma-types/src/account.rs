//! Account registration, identity verification (KYC) and terms

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Registration
// ============================================================================

/// `POST /api/register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
}

/// Raw reply to a registration attempt.
///
/// The platform either issues credentials straight away or answers with an
/// OTP challenge that must be completed through `/api/register/verify`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(default)]
    pub requires_otp: bool,
    /// Masked address the code was sent to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RegisterResponse {
    /// Interpret the reply. `None` when it carries neither credentials nor a challenge.
    pub fn into_registration(self, requested_email: &str) -> Option<Registration> {
        if self.requires_otp {
            return Some(Registration::OtpRequired {
                email: self.email.unwrap_or_else(|| requested_email.to_string()),
            });
        }
        match (self.account_id, self.secret_key) {
            (Some(account_id), Some(secret_key)) => Some(Registration::Registered(
                AccountCredentials { account_id, secret_key },
            )),
            _ => None,
        }
    }
}

/// `POST /api/register/verify`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyRegistrationRequest {
    pub email: String,
    pub code: String,
}

/// Account id plus the owner key. The key is shown exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCredentials {
    pub account_id: String,
    pub secret_key: String,
}

/// Outcome of a registration attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Registered(AccountCredentials),
    OtpRequired { email: String },
}

// ============================================================================
// KYC
// ============================================================================

/// Identity verification state as reported by the platform.
///
/// Unrecognised values decode as [`KycStatus::Unknown`] and are treated as
/// still in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    #[default]
    NotStarted,
    Pending,
    Approved,
    Denied,
    Rejected,
    #[serde(alias = "cancelled")]
    Canceled,
    Locked,
    #[serde(other)]
    Unknown,
}

impl KycStatus {
    pub fn is_approved(self) -> bool {
        self == Self::Approved
    }

    /// No amount of waiting will turn these into an approval
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Denied | Self::Rejected | Self::Canceled | Self::Locked
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
            Self::Rejected => "rejected",
            Self::Canceled => "canceled",
            Self::Locked => "locked",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Postal address submitted with a KYC application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycAddress {
    pub line1: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country_code: String,
}

/// `POST /api/kyc` with identity fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub birth_date: String,
    pub national_id: String,
    pub country_of_issue: String,
    pub phone_country_code: String,
    pub phone_number: String,
    pub address: KycAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// Reply to a KYC submission or status query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KycResponse {
    pub status: KycStatus,
    /// Hosted verification page the human must complete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kyc_url: Option<String>,
    /// Denial reason, when the platform gives one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// ============================================================================
// Terms
// ============================================================================

/// `GET /api/terms/status` and `POST /api/terms/accept`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsResponse {
    pub accepted: bool,
}
