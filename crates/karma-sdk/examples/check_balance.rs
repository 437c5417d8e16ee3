//! Check the balance of your agent's card
//!
//! Run with: KARMA_AGENT_KEY=sk_agent_... cargo run -p karma-sdk --example check_balance

use karma_sdk::{KarmaAgent, KarmaResult};

#[tokio::main]
async fn main() -> KarmaResult<()> {
    let agent = KarmaAgent::new(std::env::var("KARMA_AGENT_KEY").unwrap_or_default())?;

    let balance = agent.balance().await?;
    println!("{balance:#?}");

    Ok(())
}
