use anyhow::{Context, Result};
use karma_sdk::{KarmaOwner, Registration};
use tracing::info;

use crate::display;
use crate::error::SetupError;
use crate::prompt::Prompt;
use crate::setup::Setup;

pub(crate) async fn run<P: Prompt>(setup: &mut Setup<P>) -> Result<()> {
    let email = setup.prompt.input("Enter your email")?;
    if email.is_empty() {
        return Err(SetupError::MissingInput("Email").into());
    }

    display::info("Registering...");
    let config = &setup.options.config;
    let registration = KarmaOwner::register(config, &email)
        .await
        .context("registration failed")?;

    let credentials = match registration {
        Registration::Registered(credentials) => credentials,
        Registration::OtpRequired { email: sent_to } => {
            display::info(&format!("A verification code was sent to {sent_to}"));
            let code = setup.prompt.input("Verification code")?;
            if code.is_empty() {
                return Err(SetupError::MissingInput("Verification code").into());
            }
            KarmaOwner::verify_registration(config, &email, &code)
                .await
                .context("email verification failed")?
        }
    };

    info!(account_id = %credentials.account_id, "registered");
    setup.state.email = Some(email);
    setup.state.account_id = Some(credentials.account_id.clone());
    setup.state.owner_key = Some(credentials.secret_key.clone());

    display::success(&format!("Account created: {}", credentials.account_id));
    display::labeled("Owner key", &credentials.secret_key);
    display::warning("Save this key. It is shown only once.");
    Ok(())
}
