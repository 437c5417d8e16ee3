//! Agent client - uses an `sk_agent_` key
//!
//! Scoped to one card. Reads balance, card details and history, and asks the
//! platform whether a purchase fits. Cannot withdraw, freeze or change limits.

use std::fmt;

use karma_types::*;

use crate::config::Config;
use crate::error::{KarmaError, KarmaResult};
use crate::http::{ApiRequest, HttpClient};

/// Default page size for transaction history
pub const DEFAULT_TRANSACTION_LIMIT: u32 = 20;

pub struct KarmaAgent {
    api_key: String,
    http: HttpClient,
}

impl KarmaAgent {
    /// Build an agent client against the endpoint from the environment
    pub fn new(api_key: impl Into<String>) -> KarmaResult<Self> {
        Self::with_config(api_key, &Config::from_env())
    }

    /// Build an agent client. Fails unless the key is an agent key.
    pub fn with_config(api_key: impl Into<String>, config: &Config) -> KarmaResult<Self> {
        let api_key = api_key.into();
        if !CredentialScope::Agent.admits(&api_key) {
            return Err(KarmaError::InvalidCredential {
                client: "KarmaAgent",
                expected_prefix: CredentialScope::Agent.prefix(),
            });
        }

        Ok(Self {
            api_key,
            http: HttpClient::new(config)?,
        })
    }

    /// Available balance, pending holds and remaining budget
    pub async fn balance(&self) -> KarmaResult<BalanceResponse> {
        self.http
            .send(ApiRequest::get("/api/spend/balance").bearer(&self.api_key))
            .await
    }

    /// Full card details (PAN, CVV, expiry) for checkout
    pub async fn card_details(&self) -> KarmaResult<CardDetailsResponse> {
        self.http
            .send(ApiRequest::get("/api/spend/card").bearer(&self.api_key))
            .await
    }

    /// Ask whether `amount` fits the balance and limits, fees included
    pub async fn can_spend(&self, amount: f64, currency: &str) -> KarmaResult<CanSpendResponse> {
        let request = CanSpendRequest {
            amount,
            currency: currency.to_string(),
        };
        self.http
            .send(
                ApiRequest::post("/api/spend/can-spend")
                    .bearer(&self.api_key)
                    .json(&request)?,
            )
            .await
    }

    /// Most recent transactions, newest first
    pub async fn transactions(&self, limit: u32) -> KarmaResult<TransactionsResponse> {
        self.http
            .send(
                ApiRequest::get(format!("/api/spend/transactions?limit={limit}"))
                    .bearer(&self.api_key),
            )
            .await
    }
}

impl fmt::Debug for KarmaAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KarmaAgent")
            .field("base_url", &self.http.base_url())
            .field("api_key", &redact_key(&self.api_key))
            .finish()
    }
}
