//! Create a virtual card for an agent
//!
//! Uses the owner (`sk_live_`) key. Run it once, then hand the printed
//! `sk_agent_` key to your agent.
//!
//! Run with: KARMA_API_KEY=sk_live_... cargo run -p karma-sdk --example create_card

use karma_sdk::{CardLimits, CreateCardRequest, KarmaOwner, KarmaResult};

#[tokio::main]
async fn main() -> KarmaResult<()> {
    let owner = KarmaOwner::new(std::env::var("KARMA_API_KEY").unwrap_or_default())?;

    let card = owner
        .create_card(&CreateCardRequest::new("Shopping Agent", CardLimits::default()))
        .await?;

    println!("Card created:");
    println!("  Card ID:         {}", card.card_id);
    println!("  Last 4:          {}", card.last4);
    println!("  Deposit address: {}", card.deposit_address);
    println!("  Agent key:       {}", card.agent_api_key);
    println!();
    println!("Send USDC to the deposit address to fund the card.");
    println!("Give the agent key to your AI agent.");

    Ok(())
}
