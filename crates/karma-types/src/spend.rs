//! Agent-side reads: balance, card details, spend checks and history

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Point-in-time balance of a card, in USDC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub available: f64,
    /// Total balance including pending holds
    pub balance: f64,
    #[serde(default)]
    pub pending_holds: f64,
    #[serde(default)]
    pub daily_remaining: f64,
    #[serde(default)]
    pub monthly_remaining: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_address: Option<String>,
}

impl BalanceResponse {
    /// A deposit has landed
    pub fn is_funded(&self) -> bool {
        self.balance > 0.0
    }
}

/// Full card details for checkout (PAN, CVV, expiry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetailsResponse {
    pub number: String,
    pub cvv: String,
    #[serde(default)]
    pub expiry: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub expiry_month: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub expiry_year: String,
}

impl CardDetailsResponse {
    /// `MM/YYYY` when month and year are known, otherwise the raw expiry
    pub fn expiry_display(&self) -> String {
        if self.expiry_month.is_empty() || self.expiry_year.is_empty() {
            self.expiry.clone()
        } else {
            format!("{}/{}", self.expiry_month, self.expiry_year)
        }
    }
}

// The platform has sent expiry parts both as strings and as numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// `POST /api/spend/can-spend`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanSpendRequest {
    pub amount: f64,
    pub currency: String,
}

/// Remote verdict on a proposed purchase. Fees and totals are computed by
/// the platform; nothing here is derived locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanSpendResponse {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// One ledger entry of a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub id: String,
    /// `credit` or `debit`
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    pub status: String,
    pub created_at: String,
}

impl Transaction {
    pub fn is_credit(&self) -> bool {
        self.kind.eq_ignore_ascii_case("credit")
    }

    /// Merchant when known, otherwise the entry type
    pub fn label(&self) -> &str {
        self.merchant.as_deref().unwrap_or(&self.kind)
    }
}

/// `GET /api/spend/transactions?limit=N`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionsResponse {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}
