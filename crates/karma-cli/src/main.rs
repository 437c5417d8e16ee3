//! Karma Agent - interactive setup for an AI agent's virtual card
//!
//! ```bash
//! karma-agent                     # start, or resume from ~/.karma-agent.json
//! KARMA_API_URL=http://localhost:8787 karma-agent
//! RUST_LOG=karma_sdk=debug karma-agent
//! ```

use std::process::ExitCode;

use clap::Parser;
use colored::*;
use karma_cli::{display, Setup, SetupError, SetupOptions, TerminalPrompt};
use tracing_subscriber::EnvFilter;

/// Register, verify, issue and fund a Karma agent card, then operate it
#[derive(Parser)]
#[command(name = "karma-agent")]
#[command(author = "Karma Contributors")]
#[command(version)]
#[command(about = "Interactive setup and operational CLI for Karma agent cards", long_about = None)]
struct Cli {}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env if present
    dotenvy::dotenv().ok();

    let _cli = Cli::parse();

    // Logs go to stderr so they never interleave with prompts
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    print_banner();

    let mut setup = Setup::new(SetupOptions::from_env(), TerminalPrompt);
    match setup.run().await {
        Ok(()) => {
            println!();
            display::info("Goodbye.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!();
            if let Some(SetupError::Kyc { status, reason }) = err.downcast_ref::<SetupError>() {
                display::error(&format!("Verification {status}. Reason: {reason}"));
            } else {
                display::error(&format!("Error: {err:#}"));
                display::info(&format!(
                    "State saved to {}. Run again to resume.",
                    setup.state_path().display()
                ));
            }
            ExitCode::FAILURE
        }
    }
}

fn print_banner() {
    println!();
    println!("{}", "╔══════════════════════════════════════════════════════════════════╗".bright_cyan());
    println!("{}", "║                                                                  ║".bright_cyan());
    println!("{}{}{}",
        "║  ".bright_cyan(),
        "Karma Agent".bright_white().bold(),
        " - Virtual Cards for AI Agents                       ║".bright_cyan()
    );
    println!("{}", "║  Funded with USDC on Solana, spendable anywhere cards work      ║".bright_cyan());
    println!("{}", "║                                                                  ║".bright_cyan());
    println!("{}", "╚══════════════════════════════════════════════════════════════════╝".bright_cyan());
    println!();
}
