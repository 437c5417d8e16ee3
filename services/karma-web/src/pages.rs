//! Server-rendered wizard pages

use std::fmt::Write;

use karma_sdk::{BalanceResponse, CreateCardResponse};

use crate::wizard::{Session, WizardStep, DEFAULT_WEB_CARD_NAME};

/// Seconds between verification status checks on the waiting page
pub const KYC_REFRESH_SECS: u32 = 5;
/// Seconds between balance refreshes on the dashboard
pub const DASHBOARD_REFRESH_SECS: u32 = 10;

pub const ESIGN_URL: &str = "https://karmapay.xyz/esign-consent";
pub const CARD_TERMS_URL: &str = "https://www.karmacard.io/card-terms";
pub const ISSUER_PRIVACY_URL: &str = "https://www.third-national.com/privacypolicy";

/// Escape text for HTML element and attribute context
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the page for the session's current step.
///
/// `notice` and `error` are the one-shot messages taken from the session.
pub fn render(session: &Session, notice: Option<&str>, error: Option<&str>) -> String {
    let mut body = String::new();
    if let Some(notice) = notice {
        let _ = write!(body, r#"<div class="notice">{}</div>"#, escape(notice));
    }
    if let Some(error) = error {
        let _ = write!(body, r#"<div class="error">{}</div>"#, escape(error));
    }

    let refresh = match session.step {
        WizardStep::Register if session.otp_sent_to.is_some() => {
            body.push_str(&otp_form(session.otp_sent_to.as_deref().unwrap_or_default()));
            None
        }
        WizardStep::Register => {
            body.push_str(REGISTER_FORM);
            None
        }
        WizardStep::Kyc => match &session.kyc_url {
            Some(url) => {
                body.push_str(&kyc_waiting(url));
                Some(KYC_REFRESH_SECS)
            }
            None => {
                body.push_str(KYC_FORM);
                None
            }
        },
        WizardStep::Agreements => {
            body.push_str(&agreements_form());
            None
        }
        WizardStep::CreateCard => {
            body.push_str(&card_form());
            None
        }
        WizardStep::Dashboard => {
            body.push_str(&dashboard(session.card.as_ref(), session.balance.as_ref()));
            Some(DASHBOARD_REFRESH_SECS)
        }
    };

    layout(session.step, &body, refresh)
}

fn layout(step: WizardStep, body: &str, refresh: Option<u32>) -> String {
    let refresh = refresh
        .map(|secs| format!(r#"<meta http-equiv="refresh" content="{secs}">"#))
        .unwrap_or_default();

    let mut progress = String::new();
    let current = WizardStep::ALL.iter().position(|s| *s == step).unwrap_or(0);
    for (i, s) in WizardStep::ALL.iter().enumerate() {
        let class = match i.cmp(&current) {
            std::cmp::Ordering::Less => "done",
            std::cmp::Ordering::Equal => "current",
            std::cmp::Ordering::Greater => "todo",
        };
        let _ = write!(progress, r#"<li class="{class}">{}</li>"#, s.label());
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
{refresh}
<title>Karma - {title}</title>
<link rel="stylesheet" href="/wizard.css">
</head>
<body>
<header><a href="/">Karma</a></header>
<main>
<ol class="steps">{progress}</ol>
<h2>{title}</h2>
{body}
<form method="post" action="/dashboard/reset" class="reset"><button type="submit">Start over</button></form>
</main>
</body>
</html>"#,
        title = step.title(),
    )
}

const REGISTER_FORM: &str = r#"<form method="post" action="/dashboard/register">
<label>Email <input type="email" name="email" placeholder="you@example.com" required></label>
<button type="submit">Create account</button>
</form>
<details>
<summary>Already have an owner key?</summary>
<form method="post" action="/dashboard/resume">
<label>Owner key <input type="password" name="owner_key" placeholder="sk_live_..." required></label>
<button type="submit">Continue</button>
</form>
</details>"#;

fn otp_form(sent_to: &str) -> String {
    format!(
        r#"<p>We sent a 6-digit code to {}.</p>
<form method="post" action="/dashboard/register/verify">
<label>6-digit code <input name="code" inputmode="numeric" placeholder="123456" required></label>
<button type="submit">Verify</button>
</form>"#,
        escape(sent_to)
    )
}

const KYC_FORM: &str = r#"<form method="post" action="/dashboard/kyc">
<fieldset><legend>Personal</legend>
<label>First Name <input name="first_name" placeholder="John"></label>
<label>Last Name <input name="last_name" placeholder="Doe"></label>
<label>Date of Birth <input type="date" name="birth_date"></label>
<label>Country (ISO code) <input name="country" placeholder="GB" maxlength="2"></label>
<label>National ID <input name="national_id" placeholder="ID number"></label>
</fieldset>
<fieldset><legend>Phone</legend>
<label>Code <input name="phone_code" placeholder="+1"></label>
<label>Phone Number <input name="phone_number" placeholder="555 123 4567"></label>
</fieldset>
<fieldset><legend>Address</legend>
<label>Street Address <input name="line1" placeholder="123 Main St"></label>
<label>City <input name="city" placeholder="New York"></label>
<label>State / Region <input name="region" placeholder="NY"></label>
<label>Postal Code <input name="postal_code" placeholder="10001"></label>
</fieldset>
<button type="submit">Submit verification</button>
</form>"#;

fn kyc_waiting(url: &str) -> String {
    format!(
        r#"<div class="panel">
<p><strong>Verification required</strong></p>
<p>Complete identity verification with our card partner:</p>
<p><a class="button" href="{}" target="_blank" rel="noopener noreferrer">Complete Verification</a></p>
</div>
<p class="waiting">Waiting for verification... this page checks again every {KYC_REFRESH_SECS} seconds.</p>"#,
        escape(url)
    )
}

fn agreements_form() -> String {
    format!(
        r#"<p>Please review and accept the following to continue.</p>
<form method="post" action="/dashboard/terms">
<label><input type="checkbox" name="esign"> I accept the <a href="{ESIGN_URL}" target="_blank" rel="noopener noreferrer">E-Sign Consent</a></label>
<label><input type="checkbox" name="card_terms"> I accept the <a href="{CARD_TERMS_URL}" target="_blank" rel="noopener noreferrer">Karma Card Terms</a>, and the <a href="{ISSUER_PRIVACY_URL}" target="_blank" rel="noopener noreferrer">Issuer Privacy Policy</a></label>
<label><input type="checkbox" name="certify"> I certify that the information I have provided is accurate and that I will abide by all the rules and requirements related to my Karma Spend Card.</label>
<label><input type="checkbox" name="no_solicitation"> I acknowledge that applying for the Karma Spend Card does not constitute unauthorized solicitation.</label>
<button type="submit">Accept and continue</button>
</form>"#
    )
}

fn card_form() -> String {
    format!(
        r#"<form method="post" action="/dashboard/cards">
<label>Card name <input name="name" value="{DEFAULT_WEB_CARD_NAME}" placeholder="Shopping Agent"></label>
<label>Per txn ($) <input type="number" name="per_txn" value="100" min="0" step="any"></label>
<label>Daily ($) <input type="number" name="daily" value="500" min="0" step="any"></label>
<label>Monthly ($) <input type="number" name="monthly" value="2000" min="0" step="any"></label>
<button type="submit">Create card</button>
</form>"#
    )
}

fn dashboard(card: Option<&CreateCardResponse>, balance: Option<&BalanceResponse>) -> String {
    let mut out = String::new();

    if let Some(card) = card {
        let _ = write!(
            out,
            r#"<section class="card">
<p class="card-name">{name}</p>
<p class="card-number">**** **** **** {last4}</p>
</section>
<section>
<h3>Deposit address (USDC on Solana)</h3>
<code>{address}</code>
</section>
<section>
<h3>Agent API key</h3>
<code>{key}</code>
<p class="warning">Save the agent key. It is shown only once.</p>
</section>"#,
            name = escape(card.name.as_deref().unwrap_or(DEFAULT_WEB_CARD_NAME)),
            last4 = escape(&card.last4),
            address = escape(&card.deposit_address),
            key = escape(&card.agent_api_key),
        );
    }

    match balance {
        Some(balance) => {
            let _ = write!(
                out,
                r#"<section class="balance">
<h3>Balance</h3>
<dl>
<dt>Balance</dt><dd>${:.2} USDC</dd>
<dt>Available</dt><dd>${:.2} USDC</dd>
<dt>Pending</dt><dd>${:.2} USDC</dd>
<dt>Daily left</dt><dd>${:.2}</dd>
<dt>Monthly left</dt><dd>${:.2}</dd>
</dl>
</section>"#,
                balance.balance,
                balance.available,
                balance.pending_holds,
                balance.daily_remaining,
                balance.monthly_remaining,
            );
        }
        None => out.push_str(r#"<p class="waiting">Loading balance...</p>"#),
    }

    out
}
