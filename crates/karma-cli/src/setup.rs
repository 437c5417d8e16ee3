//! Setup driver
//!
//! Runs the steps in order. Each step is skipped when the saved state
//! already covers it, and the state file is rewritten after every step so a
//! later run resumes where this one stopped.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use karma_sdk::{Config, KarmaAgent, KarmaOwner};
use tracing::{debug, warn};

use crate::display;
use crate::poll::{Progress, StdoutProgress};
use crate::prompt::Prompt;
use crate::state::{default_state_path, AgentState, StateStore};
use crate::steps;

/// Interval between status checks while waiting on the platform
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SetupOptions {
    pub config: Config,
    pub state_path: PathBuf,
    pub poll_interval: Duration,
    /// Launch the system browser for hosted verification links
    pub open_browser: bool,
}

impl SetupOptions {
    pub fn from_env() -> Self {
        Self {
            config: Config::from_env(),
            state_path: default_state_path(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            open_browser: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Register,
    VerifyIdentity,
    AcceptTerms,
    CreateCard,
    AwaitFunding,
    Operate,
}

impl Step {
    pub const ORDER: [Step; 6] = [
        Step::Register,
        Step::VerifyIdentity,
        Step::AcceptTerms,
        Step::CreateCard,
        Step::AwaitFunding,
        Step::Operate,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Step::Register => "Step 1: Register",
            Step::VerifyIdentity => "Step 2: Identity Verification",
            Step::AcceptTerms => "Step 3: Card Terms",
            Step::CreateCard => "Step 4: Create Virtual Card",
            Step::AwaitFunding => "Step 5: Fund Your Card",
            Step::Operate => "Karma Agent - Operational",
        }
    }

    /// Funding is re-checked on every run; the menu always runs.
    pub fn is_satisfied(self, state: &AgentState) -> bool {
        match self {
            Step::Register => state.is_registered(),
            Step::VerifyIdentity => state.kyc_approved(),
            Step::AcceptTerms => state.terms_accepted,
            Step::CreateCard => state.has_card(),
            Step::AwaitFunding | Step::Operate => false,
        }
    }

    fn skip_notice(self, state: &AgentState) -> Option<String> {
        let or_unknown = |v: &Option<String>| v.clone().unwrap_or_else(|| "unknown".to_string());
        match self {
            Step::Register => Some(format!(
                "Already registered (account: {})",
                or_unknown(&state.account_id)
            )),
            Step::VerifyIdentity => Some("Identity already verified.".to_string()),
            Step::AcceptTerms => Some("Card terms already accepted.".to_string()),
            Step::CreateCard => Some(format!(
                "Card already created: **** {} ({})",
                or_unknown(&state.card_last4),
                or_unknown(&state.card_name)
            )),
            Step::AwaitFunding | Step::Operate => None,
        }
    }
}

pub struct Setup<P> {
    pub(crate) options: SetupOptions,
    pub(crate) store: StateStore,
    pub(crate) state: AgentState,
    pub(crate) prompt: P,
    pub(crate) progress: Box<dyn Progress>,
}

impl<P: Prompt> Setup<P> {
    /// Load any saved state from `options.state_path`
    pub fn new(options: SetupOptions, prompt: P) -> Self {
        let store = StateStore::new(options.state_path.clone());
        let state = store.load();
        Self {
            options,
            store,
            state,
            prompt,
            progress: Box::new(StdoutProgress::default()),
        }
    }

    pub fn with_progress(mut self, progress: impl Progress + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn state_path(&self) -> &Path {
        self.store.path()
    }

    /// Drive every step to completion. Returns when the operator quits.
    pub async fn run(&mut self) -> Result<()> {
        for step in Step::ORDER {
            if step.is_satisfied(&self.state) {
                debug!(?step, "step already satisfied");
                if let Some(notice) = step.skip_notice(&self.state) {
                    display::info(&notice);
                }
                continue;
            }

            display::section(step.title());
            let outcome = self.advance(step).await;
            self.save()?;
            outcome?;
        }
        Ok(())
    }

    /// Run a single step regardless of saved state
    pub async fn advance(&mut self, step: Step) -> Result<()> {
        match step {
            Step::Register => steps::register::run(self).await,
            Step::VerifyIdentity => steps::kyc::run(self).await,
            Step::AcceptTerms => steps::terms::run(self).await,
            Step::CreateCard => steps::card::run(self).await,
            Step::AwaitFunding => steps::funding::run(self).await,
            Step::Operate => steps::operate::run(self).await,
        }
    }

    pub fn save(&self) -> Result<()> {
        self.store
            .save(&self.state)
            .with_context(|| format!("could not write {}", self.store.path().display()))
    }

    pub(crate) fn owner(&self) -> Result<KarmaOwner> {
        let key = self
            .state
            .owner_key
            .as_deref()
            .ok_or_else(|| anyhow!("no owner key saved; registration has not completed"))?;
        Ok(KarmaOwner::with_config(key, &self.options.config)?)
    }

    pub(crate) fn agent(&self) -> Result<KarmaAgent> {
        let key = self
            .state
            .agent_key
            .as_deref()
            .ok_or_else(|| anyhow!("no agent key saved; card creation has not completed"))?;
        Ok(KarmaAgent::with_config(key, &self.options.config)?)
    }
}

/// Hand `url` to the platform's opener. Failure only costs a warning; the
/// link is printed as well.
pub fn open_in_browser(url: &str) {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    } else {
        Command::new("xdg-open")
    };

    if let Err(err) = command.arg(url).spawn() {
        warn!(error = %err, "could not open browser");
    }
}
