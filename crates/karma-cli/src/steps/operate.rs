//! Operational menu
//!
//! Every command is a single agent-key call. Failures are printed and the
//! menu comes back; only `5` leaves.

use anyhow::Result;
use karma_sdk::{KarmaAgent, KarmaResult, DEFAULT_CURRENCY};

use crate::display;
use crate::prompt::Prompt;
use crate::setup::Setup;

/// Transactions listed by the menu
pub const OPERATE_TRANSACTION_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Balance,
    CanSpend,
    CardDetails,
    Transactions,
    Exit,
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Command::Balance),
            "2" => Some(Command::CanSpend),
            "3" => Some(Command::CardDetails),
            "4" => Some(Command::Transactions),
            "5" => Some(Command::Exit),
            _ => None,
        }
    }
}

/// A strictly positive, finite amount
pub fn parse_amount(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount > 0.0)
}

fn print_menu() {
    println!();
    println!("  Commands:");
    println!("    [1] Check balance");
    println!("    [2] Can I spend $X?");
    println!("    [3] Get card details (PAN/CVV)");
    println!("    [4] View transactions");
    println!("    [5] Exit");
}

pub(crate) async fn run<P: Prompt>(setup: &mut Setup<P>) -> Result<()> {
    let agent = setup.agent()?;
    let state = &setup.state;
    display::labeled(
        "Card",
        &format!(
            "**** {} ({})",
            state.card_last4.as_deref().unwrap_or("????"),
            state.card_name.as_deref().unwrap_or("unnamed")
        ),
    );
    display::labeled("Deposit", state.deposit_address.as_deref().unwrap_or("unknown"));

    loop {
        print_menu();
        let choice = setup.prompt.input(">")?;
        let Some(command) = Command::parse(&choice) else {
            display::warning("Unknown command. Enter 1-5.");
            continue;
        };

        let outcome = match command {
            Command::Exit => return Ok(()),
            Command::Balance => show_balance(&agent).await,
            Command::CanSpend => {
                let input = setup.prompt.input("Amount (USD)")?;
                match parse_amount(&input) {
                    Some(amount) => check_spend(&agent, amount).await,
                    None => {
                        display::warning("Invalid amount.");
                        Ok(())
                    }
                }
            }
            Command::CardDetails => show_card(&agent).await,
            Command::Transactions => show_transactions(&agent).await,
        };

        if let Err(err) = outcome {
            display::error(&format!("Error: {err}"));
        }
    }
}

async fn show_balance(agent: &KarmaAgent) -> KarmaResult<()> {
    let balance = agent.balance().await?;
    display::rows(&display::balance_rows(&balance));
    Ok(())
}

async fn check_spend(agent: &KarmaAgent, amount: f64) -> KarmaResult<()> {
    let check = agent.can_spend(amount, DEFAULT_CURRENCY).await?;
    display::rows(&display::spend_check_rows(amount, &check));
    Ok(())
}

async fn show_card(agent: &KarmaAgent) -> KarmaResult<()> {
    let card = agent.card_details().await?;
    display::rows(&display::card_detail_rows(&card));
    Ok(())
}

async fn show_transactions(agent: &KarmaAgent) -> KarmaResult<()> {
    let page = agent.transactions(OPERATE_TRANSACTION_LIMIT).await?;
    println!();
    if page.transactions.is_empty() {
        display::info("No transactions yet.");
    }
    for tx in &page.transactions {
        println!("  {}", display::transaction_line(tx));
    }
    Ok(())
}
