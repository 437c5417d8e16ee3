use anyhow::{Context, Result};
use karma_sdk::{CardLimits, CreateCardRequest};
use tracing::{debug, info};

use crate::display::{self, money};
use crate::prompt::Prompt;
use crate::setup::Setup;

pub const DEFAULT_CARD_NAME: &str = "Karma Agent Card";

pub(crate) async fn run<P: Prompt>(setup: &mut Setup<P>) -> Result<()> {
    let owner = setup.owner()?;

    // A lost state file must not lead to a second card on the account
    let existing = owner
        .list_cards()
        .await
        .context("could not list existing cards")?;
    debug!(count = existing.len(), "existing cards");
    if let Some(card) = existing.into_iter().next() {
        display::warning(&format!(
            "This account already has a card: **** {} ({})",
            card.last4, card.name
        ));
        if setup
            .prompt
            .confirm("Issue a new agent key for it instead of creating another card?", true)?
        {
            let rotated = owner
                .rotate_agent_key(&card.card_id)
                .await
                .context("could not rotate agent key")?;
            info!(card_id = %card.card_id, "agent key rotated");

            display::success("Agent key rotated. The previous key no longer works.");
            display::labeled("Agent API key", &rotated.agent_api_key);
            display::warning("Save the agent key. It is shown only once.");
            setup.state.record_card(
                card.card_id,
                rotated.agent_api_key,
                card.deposit_address,
                card.last4,
                card.name,
            );
            return Ok(());
        }
    }

    let name = setup.prompt.input("Card name (e.g. Shopping Agent)")?;
    let name = if name.is_empty() {
        DEFAULT_CARD_NAME.to_string()
    } else {
        name
    };
    let per_txn = setup.prompt.input("Per-transaction limit in USD (default 100)")?;
    let daily = setup.prompt.input("Daily limit in USD (default 500)")?;
    let monthly = setup.prompt.input("Monthly limit in USD (default 2000)")?;
    let limits = CardLimits::from_inputs(&per_txn, &daily, &monthly);

    display::info("Creating card...");
    let card = owner
        .create_card(&CreateCardRequest::new(name.clone(), limits))
        .await
        .context("could not create card")?;
    info!(card_id = %card.card_id, "card created");

    let shown = card.limits.unwrap_or(limits);
    display::success("Card created!");
    display::rows(&[
        ("Name", name.clone()),
        ("Last 4", card.last4.clone()),
        (
            "Limits",
            format!(
                "{}/txn, {}/day, {}/month",
                money(shown.per_txn),
                money(shown.daily),
                money(shown.monthly)
            ),
        ),
        ("Deposit (USDC)", card.deposit_address.clone()),
        ("Agent API key", card.agent_api_key.clone()),
    ]);
    display::warning("Save the agent key. It is shown only once.");

    setup.state.record_card(
        card.card_id,
        card.agent_api_key,
        card.deposit_address,
        card.last4,
        name,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::prompt::ScriptedPrompt;
    use crate::setup::Step;
    use crate::state::{AgentState, StateStore};
    use crate::testing::{options, spawn_stub};
    use axum::{
        extract::Path,
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};

    fn platform(existing: Value, created: Arc<Mutex<Vec<Value>>>) -> Router {
        Router::new()
            .route(
                "/api/cards",
                get(move || {
                    let existing = existing.clone();
                    async move { Json(existing) }
                })
                .post(move |Json(body): Json<Value>| {
                    let created = created.clone();
                    async move {
                        created.lock().unwrap().push(body);
                        Json(json!({
                            "card_id": "card_1",
                            "agent_api_key": "sk_agent_abc",
                            "deposit_address": "Gx...1337",
                            "last4": "4821",
                            "name": "ignored by the client",
                        }))
                    }
                }),
            )
            .route(
                "/api/cards/:id/rotate-key",
                post(|Path(id): Path<String>| async move {
                    Json(json!({"agent_api_key": format!("sk_agent_rotated_{id}")}))
                }),
            )
    }

    async fn registered(
        dir: &tempfile::TempDir,
        router: Router,
        answers: &[&str],
    ) -> Setup<ScriptedPrompt> {
        let opts = options(dir, spawn_stub(router).await);
        StateStore::new(opts.state_path.clone())
            .save(&AgentState {
                owner_key: Some("sk_live_abc".into()),
                ..Default::default()
            })
            .unwrap();
        Setup::new(opts, ScriptedPrompt::new(answers.iter().copied()))
    }

    #[tokio::test]
    async fn test_create_card_persists_reply_and_supplied_name() {
        let dir = tempfile::tempdir().unwrap();
        let created = Arc::new(Mutex::new(Vec::new()));
        let router = platform(json!([]), created.clone());
        let mut setup = registered(&dir, router, &["Shopping Agent", "", "x", "-1"]).await;

        setup.advance(Step::CreateCard).await.unwrap();
        setup.save().unwrap();

        let sent = created.lock().unwrap().clone();
        assert_eq!(
            sent,
            vec![json!({
                "name": "Shopping Agent",
                "per_txn_limit": 100.0,
                "daily_limit": 500.0,
                "monthly_limit": 2000.0,
            })]
        );

        let saved = StateStore::new(setup.state_path()).load();
        assert_eq!(saved.card_id.as_deref(), Some("card_1"));
        assert_eq!(saved.card_last4.as_deref(), Some("4821"));
        assert_eq!(saved.deposit_address.as_deref(), Some("Gx...1337"));
        assert_eq!(saved.agent_key.as_deref(), Some("sk_agent_abc"));
        assert_eq!(saved.card_name.as_deref(), Some("Shopping Agent"));
    }

    #[tokio::test]
    async fn test_unlisted_cards_abort_before_creating() {
        let dir = tempfile::tempdir().unwrap();
        let created = Arc::new(Mutex::new(Vec::new()));
        let recorder = created.clone();
        let router = Router::new().route(
            "/api/cards",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "db down"})),
                )
            })
            .post(move |Json(body): Json<Value>| {
                let recorder = recorder.clone();
                async move {
                    recorder.lock().unwrap().push(body);
                    Json(json!({
                        "card_id": "card_1",
                        "agent_api_key": "sk_agent_abc",
                        "deposit_address": "Gx...1337",
                        "last4": "4821",
                    }))
                }
            }),
        );
        let mut setup = registered(&dir, router, &["Shopping Agent", "", "", ""]).await;

        let err = setup.advance(Step::CreateCard).await.unwrap_err();

        assert!(format!("{err:#}").contains("db down"));
        assert!(created.lock().unwrap().is_empty());
        assert!(!setup.state().has_card());
        assert_eq!(setup.prompt.remaining(), 4);
    }

    #[tokio::test]
    async fn test_blank_name_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let router = platform(json!([]), Arc::default());
        let mut setup = registered(&dir, router, &["", "50", "200", "1000"]).await;

        setup.advance(Step::CreateCard).await.unwrap();
        assert_eq!(setup.state().card_name.as_deref(), Some(DEFAULT_CARD_NAME));
    }

    #[tokio::test]
    async fn test_existing_card_recovers_by_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let created = Arc::new(Mutex::new(Vec::new()));
        let existing = json!([{
            "card_id": "card_7",
            "name": "Travel",
            "last4": "9911",
            "deposit_address": "Hy...2024",
        }]);
        let mut setup = registered(&dir, platform(existing, created.clone()), &["y"]).await;

        setup.advance(Step::CreateCard).await.unwrap();

        assert!(created.lock().unwrap().is_empty());
        let state = setup.state();
        assert_eq!(state.card_id.as_deref(), Some("card_7"));
        assert_eq!(state.agent_key.as_deref(), Some("sk_agent_rotated_card_7"));
        assert_eq!(state.card_last4.as_deref(), Some("9911"));
        assert_eq!(state.card_name.as_deref(), Some("Travel"));
    }
}
