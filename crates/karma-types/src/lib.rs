//! Karma Types - wire contracts for the Karma agent card API
//!
//! Every entity here is owned by the remote platform; this crate only mirrors
//! the shapes exchanged over HTTP:
//!
//! - Credentials and their scopes (owner `sk_live_` vs agent `sk_agent_`)
//! - Account registration and identity verification (KYC)
//! - Cards, limits, withdrawals and key rotation
//! - Balance snapshots, spend checks and transaction history

pub mod credential;
pub mod account;
pub mod card;
pub mod spend;

pub use credential::*;
pub use account::*;
pub use card::*;
pub use spend::*;

/// Default currency for spend checks
pub const DEFAULT_CURRENCY: &str = "USD";

/// Error body returned by the platform on non-2xx responses
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
