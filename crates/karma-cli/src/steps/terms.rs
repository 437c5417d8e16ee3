use anyhow::{bail, Context, Result};

use crate::display;
use crate::error::SetupError;
use crate::prompt::Prompt;
use crate::setup::Setup;

/// Cardholder agreement shown before a card can be issued
pub const TERMS_URL: &str = "https://www.karmacard.io/card-terms";

pub(crate) async fn run<P: Prompt>(setup: &mut Setup<P>) -> Result<()> {
    let owner = setup.owner()?;

    let current = owner
        .terms_status()
        .await
        .context("could not read terms status")?;

    if !current.accepted {
        display::info("Review the cardholder terms before your card is issued:");
        display::labeled("Terms", TERMS_URL);
        if !setup.prompt.confirm("Do you accept the card terms?", false)? {
            return Err(SetupError::TermsDeclined.into());
        }

        let reply = owner
            .accept_terms()
            .await
            .context("could not accept terms")?;
        if !reply.accepted {
            bail!("terms acceptance was not recorded");
        }
    }

    setup.state.terms_accepted = true;
    display::success("Card terms accepted.");
    Ok(())
}
