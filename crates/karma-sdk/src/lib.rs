//! Karma SDK - clients for the Karma agent card API
//!
//! Two clients, one per credential scope:
//!
//! - [`KarmaOwner`] (`sk_live_` key): register, verify identity, accept terms,
//!   create and manage cards, withdraw, rotate agent keys.
//! - [`KarmaAgent`] (`sk_agent_` key): balance, card details, spend checks
//!   and transaction history for a single card.
//!
//! Constructing a client with a key of the wrong scope fails immediately.
//! Every method is a single HTTP call; the platform does all the work.
//!
//! # Quick Start
//!
//! ```no_run
//! use karma_sdk::KarmaAgent;
//!
//! # async fn run() -> karma_sdk::KarmaResult<()> {
//! let agent = KarmaAgent::new("sk_agent_...")?;
//!
//! let check = agent.can_spend(49.99, "USD").await?;
//! if check.allowed {
//!     println!("Total with fees: ${:.2}", check.total.unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod http;
pub mod owner;

pub use karma_types::*;

pub use agent::{KarmaAgent, DEFAULT_TRANSACTION_LIMIT};
pub use config::{Config, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use error::{KarmaError, KarmaResult};
pub use http::{ApiRequest, HttpClient};
pub use owner::KarmaOwner;
