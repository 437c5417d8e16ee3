//! One handler per setup step
//!
//! Handlers mutate `Setup::state` in place; the driver persists it after
//! each handler returns, whether it succeeded or not.

pub mod card;
pub mod funding;
pub mod kyc;
pub mod operate;
pub mod register;
pub mod terms;
