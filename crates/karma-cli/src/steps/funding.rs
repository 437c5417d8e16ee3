use anyhow::Result;

use crate::display::{self, money};
use crate::poll::{funding_verdict, poll_until};
use crate::prompt::Prompt;
use crate::setup::Setup;

/// USDC token mint on Solana mainnet
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

pub(crate) async fn run<P: Prompt>(setup: &mut Setup<P>) -> Result<()> {
    let agent = setup.agent()?;

    display::info("Send USDC (Solana) to this deposit address:");
    display::labeled(
        "Deposit address",
        setup.state.deposit_address.as_deref().unwrap_or("unknown"),
    );
    display::labeled("USDC mint", USDC_MINT);
    display::info("Waiting for deposit...");

    let funded = poll_until(
        setup.options.poll_interval,
        &mut *setup.progress,
        || agent.balance(),
        funding_verdict,
    )
    .await;

    display::success(&format!("Balance detected: {} USDC", money(funded.balance)));
    display::labeled("Available to spend", &format!("{} USDC", money(funded.available)));
    Ok(())
}
