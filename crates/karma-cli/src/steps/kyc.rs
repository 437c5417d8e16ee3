use std::ops::ControlFlow;

use anyhow::{Context, Result};
use karma_sdk::{KycResponse, KycStatus};
use tracing::{debug, warn};

use crate::display;
use crate::poll::{kyc_verdict, poll_until};
use crate::prompt::Prompt;
use crate::setup::{open_in_browser, Setup};

pub(crate) async fn run<P: Prompt>(setup: &mut Setup<P>) -> Result<()> {
    let owner = setup.owner()?;

    let current = match owner.kyc_status().await {
        Ok(reply) => Some(reply),
        Err(err) => {
            debug!(error = %err, "could not read verification status");
            None
        }
    };

    if let Some(reply) = &current {
        record(setup, reply);
        setup.save()?;
        if let ControlFlow::Break(outcome) = kyc_verdict(reply) {
            outcome?;
            display::success("Identity verified.");
            return Ok(());
        }
    }

    let pending = matches!(&current, Some(reply) if reply.status == KycStatus::Pending);
    if !pending && setup.state.kyc_url.is_none() {
        display::info("Requesting verification link...");
        let reply = owner
            .start_kyc()
            .await
            .context("could not start identity verification")?;
        record(setup, &reply);
        setup.save()?;
        if let ControlFlow::Break(outcome) = kyc_verdict(&reply) {
            outcome?;
            display::success("Identity verified instantly.");
            return Ok(());
        }
    }

    if let Some(url) = setup.state.kyc_url.clone() {
        display::info("Complete the identity verification (ID + selfie) in your browser.");
        display::labeled("Verification link", &url);
        if setup.options.open_browser {
            open_in_browser(&url);
        }
    }

    display::info("Waiting for approval...");
    let Setup {
        options,
        store,
        state,
        progress,
        ..
    } = setup;
    let outcome = poll_until(
        options.poll_interval,
        &mut **progress,
        || owner.kyc_status(),
        |reply| {
            state.kyc_status = Some(reply.status);
            if let Err(err) = store.save(state) {
                warn!(error = %err, "could not save verification status");
            }
            kyc_verdict(&reply)
        },
    )
    .await;

    outcome?;
    display::success("Identity verified.");
    Ok(())
}

fn record<P>(setup: &mut Setup<P>, reply: &KycResponse) {
    setup.state.kyc_status = Some(reply.status);
    if let Some(url) = &reply.kyc_url {
        setup.state.kyc_url = Some(url.clone());
    }
}
