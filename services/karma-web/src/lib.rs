//! Karma Web - browser onboarding for agent cards
//!
//! A server-rendered wizard covering the same ground as the `karma-agent`
//! CLI: register, verify identity, accept the card agreements, create a
//! card and watch its balance. Wizard progress lives in memory per browser
//! session and is lost on restart; the owner key resumes it.

pub mod pages;
pub mod routes;
pub mod wizard;

pub use routes::{router, AppState, SESSION_COOKIE};
pub use wizard::{landing_step, Session, WizardStep};
