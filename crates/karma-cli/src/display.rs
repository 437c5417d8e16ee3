//! Display utilities for the CLI
//!
//! Renderers return plain label/value rows; printing adds the colour.

use chrono::{DateTime, Local};
use colored::*;
use karma_sdk::{BalanceResponse, CanSpendResponse, CardDetailsResponse, Transaction};

/// A label and its rendered value
pub type Row = (&'static str, String);

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", "━".repeat(60).bright_black());
    println!(" {}", title.bright_white().bold());
    println!("{}", "━".repeat(60).bright_black());
    println!();
}

/// Print a success message
pub fn success(message: &str) {
    println!("  {} {}", "✓".bright_green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    println!("  {} {}", "✗".bright_red(), message.bright_red());
}

/// Print an info message
pub fn info(message: &str) {
    println!("  {} {}", "→".bright_blue(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("  {} {}", "⚠".yellow(), message.yellow());
}

/// Print a labeled value
pub fn labeled(label: &str, value: &str) {
    println!("  {}: {}", label.bright_white(), value.bright_cyan());
}

/// Print rows with aligned values
pub fn rows(rows: &[Row]) {
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0) + 1;
    println!();
    for (label, value) in rows {
        println!("  {:<width$} {}", format!("{label}:"), value.bright_cyan());
    }
}

/// `$1.50`
pub fn money(amount: f64) -> String {
    format!("${amount:.2}")
}

pub fn balance_rows(balance: &BalanceResponse) -> Vec<Row> {
    vec![
        ("Balance", format!("{} USDC", money(balance.balance))),
        ("Available", format!("{} USDC", money(balance.available))),
        ("Pending", format!("{} USDC", money(balance.pending_holds))),
        ("Daily left", money(balance.daily_remaining)),
        ("Monthly left", money(balance.monthly_remaining)),
    ]
}

/// Spend verdict. Fees and totals come from the platform as-is.
pub fn spend_check_rows(amount: f64, check: &CanSpendResponse) -> Vec<Row> {
    if check.allowed {
        let or_na = |v: Option<f64>| v.map(money).unwrap_or_else(|| "n/a".to_string());
        return vec![
            ("Allowed", "YES".to_string()),
            ("Amount", money(amount)),
            ("Fees", or_na(check.fees)),
            ("Total", or_na(check.total)),
        ];
    }

    let mut rows = vec![
        ("Allowed", "NO".to_string()),
        ("Reason", check.reason.clone().unwrap_or_else(|| "unknown".to_string())),
    ];
    if let Some(available) = check.available {
        rows.push(("Available", money(available)));
    }
    rows
}

pub fn card_detail_rows(card: &CardDetailsResponse) -> Vec<Row> {
    vec![
        ("Card", card.number.clone()),
        ("Expiry", card.expiry_display()),
        ("CVV", card.cvv.clone()),
    ]
}

/// `+$25.00 USDC  Coffee Shop (settled) 2026-01-02`
pub fn transaction_line(tx: &Transaction) -> String {
    let sign = if tx.is_credit() { "+" } else { "-" };
    format!(
        "{sign}{} {}  {} ({}) {}",
        money(tx.amount),
        tx.currency,
        tx.label(),
        tx.status,
        local_date(&tx.created_at)
    )
}

fn local_date(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}
