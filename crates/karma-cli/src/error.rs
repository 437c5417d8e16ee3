//! Setup failures that end the process with a specific message

use karma_sdk::KycStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    /// Identity verification ended without approval
    #[error("Verification {status}: {reason}")]
    Kyc { status: KycStatus, reason: String },

    #[error("Terms of service were not accepted")]
    TermsDeclined,

    #[error("{0} is required")]
    MissingInput(&'static str),
}
