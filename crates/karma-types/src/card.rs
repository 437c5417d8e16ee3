//! Virtual cards, spending limits, withdrawals and agent key rotation

use serde::{Deserialize, Serialize};

/// Per-transaction, daily and monthly caps in USD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardLimits {
    pub per_txn: f64,
    pub daily: f64,
    pub monthly: f64,
}

impl Default for CardLimits {
    fn default() -> Self {
        Self {
            per_txn: 100.0,
            daily: 500.0,
            monthly: 2000.0,
        }
    }
}

impl CardLimits {
    /// Limits typed by an operator. Blank, non-numeric or non-positive
    /// entries fall back to the defaults.
    pub fn from_inputs(per_txn: &str, daily: &str, monthly: &str) -> Self {
        let defaults = Self::default();
        Self {
            per_txn: parse_limit(per_txn, defaults.per_txn),
            daily: parse_limit(daily, defaults.daily),
            monthly: parse_limit(monthly, defaults.monthly),
        }
    }
}

/// A strictly positive, finite number, or `default`
pub fn parse_limit(input: &str, default: f64) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|limit| limit.is_finite() && *limit > 0.0)
        .unwrap_or(default)
}

/// `POST /api/cards`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCardRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_txn_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_limit: Option<f64>,
}

impl CreateCardRequest {
    pub fn new(name: impl Into<String>, limits: CardLimits) -> Self {
        Self {
            name: name.into(),
            per_txn_limit: Some(limits.per_txn),
            daily_limit: Some(limits.daily),
            monthly_limit: Some(limits.monthly),
        }
    }
}

/// Reply to card creation. The agent key is shown exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCardResponse {
    pub card_id: String,
    pub agent_api_key: String,
    pub deposit_address: String,
    pub last4: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<CardLimits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A card as listed by `GET /api/cards`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub card_id: String,
    #[serde(default)]
    pub name: String,
    pub last4: String,
    pub deposit_address: String,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub frozen: bool,
    #[serde(default)]
    pub per_txn_limit: f64,
    #[serde(default)]
    pub daily_limit: f64,
    #[serde(default)]
    pub monthly_limit: f64,
}

/// `PATCH /api/cards/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateCardRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_txn_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_limit: Option<f64>,
}

/// `POST /api/cards/{id}/withdraw` - USDC to an external Solana wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub address: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawResponse {
    /// On-chain transaction signature
    pub signature: String,
    pub amount: f64,
}

/// `POST /api/cards/{id}/rotate-key`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotateKeyResponse {
    pub agent_api_key: String,
}
