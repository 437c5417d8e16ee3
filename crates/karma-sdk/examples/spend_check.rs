//! Check whether the agent can afford a purchase before going ahead
//!
//! Run with: KARMA_AGENT_KEY=sk_agent_... cargo run -p karma-sdk --example spend_check -- 49.99

use karma_sdk::{KarmaAgent, KarmaResult, DEFAULT_CURRENCY};

#[tokio::main]
async fn main() -> KarmaResult<()> {
    let agent = KarmaAgent::new(std::env::var("KARMA_AGENT_KEY").unwrap_or_default())?;
    let amount: f64 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(10.0);

    let result = agent.can_spend(amount, DEFAULT_CURRENCY).await?;

    if result.allowed {
        println!("Can spend ${amount}: YES");
        println!("  Fees:  ${:.2}", result.fees.unwrap_or_default());
        println!("  Total: ${:.2}", result.total.unwrap_or(amount));
    } else {
        println!("Can spend ${amount}: NO");
        if let Some(reason) = &result.reason {
            println!("  Reason:    {reason}");
        }
        if let Some(available) = result.available {
            println!("  Available: ${available:.2}");
        }
        if let Some(total) = result.total {
            println!("  Needed:    ${total:.2}");
        }
    }

    Ok(())
}
