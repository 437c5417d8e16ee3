//! Owner client - uses an `sk_live_` key
//!
//! Full access: registration follow-up, KYC, terms, card management,
//! withdrawals and agent key rotation.

use std::fmt;

use karma_types::*;
use serde::de::IgnoredAny;

use crate::config::Config;
use crate::error::{KarmaError, KarmaResult};
use crate::http::{ApiRequest, HttpClient};

pub struct KarmaOwner {
    api_key: String,
    http: HttpClient,
}

impl KarmaOwner {
    /// Build an owner client against the endpoint from the environment
    pub fn new(api_key: impl Into<String>) -> KarmaResult<Self> {
        Self::with_config(api_key, &Config::from_env())
    }

    /// Build an owner client. Fails unless the key is an owner key.
    pub fn with_config(api_key: impl Into<String>, config: &Config) -> KarmaResult<Self> {
        let api_key = api_key.into();
        if !CredentialScope::Owner.admits(&api_key) {
            return Err(KarmaError::InvalidCredential {
                client: "KarmaOwner",
                expected_prefix: CredentialScope::Owner.prefix(),
            });
        }

        Ok(Self {
            api_key,
            http: HttpClient::new(config)?,
        })
    }

    /// Register a new account. The owner key in the reply is shown once.
    ///
    /// The platform may instead send a one-time code to `email`; complete
    /// that branch with [`KarmaOwner::verify_registration`].
    pub async fn register(config: &Config, email: &str) -> KarmaResult<Registration> {
        let http = HttpClient::new(config)?;
        let reply: RegisterResponse = http
            .send(ApiRequest::post("/api/register").json(&RegisterRequest {
                email: email.to_string(),
            })?)
            .await?;

        reply.into_registration(email).ok_or_else(|| {
            KarmaError::UnexpectedResponse(
                "registration reply carried neither credentials nor an OTP challenge".to_string(),
            )
        })
    }

    /// Complete an OTP registration challenge
    pub async fn verify_registration(
        config: &Config,
        email: &str,
        code: &str,
    ) -> KarmaResult<AccountCredentials> {
        let http = HttpClient::new(config)?;
        http.send(
            ApiRequest::post("/api/register/verify").json(&VerifyRegistrationRequest {
                email: email.to_string(),
                code: code.to_string(),
            })?,
        )
        .await
    }

    /// Submit a KYC application with identity fields
    pub async fn submit_kyc(&self, data: &KycRequest) -> KarmaResult<KycResponse> {
        self.http
            .send(ApiRequest::post("/api/kyc").bearer(&self.api_key).json(data)?)
            .await
    }

    /// Request a hosted verification link instead of sending identity fields
    pub async fn start_kyc(&self) -> KarmaResult<KycResponse> {
        self.http
            .send(ApiRequest::post("/api/kyc").bearer(&self.api_key))
            .await
    }

    pub async fn kyc_status(&self) -> KarmaResult<KycResponse> {
        self.http
            .send(ApiRequest::get("/api/kyc/status").bearer(&self.api_key))
            .await
    }

    pub async fn accept_terms(&self) -> KarmaResult<TermsResponse> {
        self.http
            .send(ApiRequest::post("/api/terms/accept").bearer(&self.api_key))
            .await
    }

    pub async fn terms_status(&self) -> KarmaResult<TermsResponse> {
        self.http
            .send(ApiRequest::get("/api/terms/status").bearer(&self.api_key))
            .await
    }

    /// Create a virtual card. The agent key in the reply is shown once.
    pub async fn create_card(&self, data: &CreateCardRequest) -> KarmaResult<CreateCardResponse> {
        self.http
            .send(ApiRequest::post("/api/cards").bearer(&self.api_key).json(data)?)
            .await
    }

    pub async fn list_cards(&self) -> KarmaResult<Vec<Card>> {
        self.http
            .send(ApiRequest::get("/api/cards").bearer(&self.api_key))
            .await
    }

    /// Change card name or spending limits
    pub async fn update_card(&self, card_id: &str, data: &UpdateCardRequest) -> KarmaResult<Card> {
        self.http
            .send(
                ApiRequest::patch(card_path(card_id, ""))
                    .bearer(&self.api_key)
                    .json(data)?,
            )
            .await
    }

    /// Block all spending on a card
    pub async fn freeze_card(&self, card_id: &str) -> KarmaResult<()> {
        let _: IgnoredAny = self
            .http
            .send(ApiRequest::post(card_path(card_id, "/freeze")).bearer(&self.api_key))
            .await?;
        Ok(())
    }

    pub async fn unfreeze_card(&self, card_id: &str) -> KarmaResult<()> {
        let _: IgnoredAny = self
            .http
            .send(ApiRequest::post(card_path(card_id, "/unfreeze")).bearer(&self.api_key))
            .await?;
        Ok(())
    }

    /// Withdraw USDC from a card to an external Solana wallet
    pub async fn withdraw(&self, card_id: &str, data: &WithdrawRequest) -> KarmaResult<WithdrawResponse> {
        self.http
            .send(
                ApiRequest::post(card_path(card_id, "/withdraw"))
                    .bearer(&self.api_key)
                    .json(data)?,
            )
            .await
    }

    /// Revoke the card's agent key and issue a new one
    pub async fn rotate_agent_key(&self, card_id: &str) -> KarmaResult<RotateKeyResponse> {
        self.http
            .send(ApiRequest::post(card_path(card_id, "/rotate-key")).bearer(&self.api_key))
            .await
    }
}

impl fmt::Debug for KarmaOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KarmaOwner")
            .field("base_url", &self.http.base_url())
            .field("api_key", &redact_key(&self.api_key))
            .finish()
    }
}

fn card_path(card_id: &str, action: &str) -> String {
    format!("/api/cards/{}{}", urlencoding::encode(card_id), action)
}
