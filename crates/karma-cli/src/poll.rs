//! Fixed-interval polling
//!
//! One fetch per tick, no overlap, no backoff. Fetch failures are logged and
//! retried on the next tick; only the check decides when to stop.

use std::fmt::Display;
use std::future::Future;
use std::io::Write;
use std::ops::ControlFlow;
use std::time::Duration;

use karma_sdk::{BalanceResponse, KycResponse, KycStatus};
use tracing::debug;

use crate::error::SetupError;

/// What a single tick produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    /// The answer was not final yet
    Waiting,
    /// The fetch itself failed
    Failed,
}

impl Mark {
    pub fn symbol(self) -> char {
        match self {
            Mark::Waiting => '.',
            Mark::Failed => 'x',
        }
    }
}

/// Receives one mark per unfinished tick
pub trait Progress {
    fn mark(&mut self, mark: Mark);

    /// Called once when polling stops
    fn finish(&mut self) {}
}

/// Prints marks on one stdout line
#[derive(Debug, Default)]
pub struct StdoutProgress {
    printed: bool,
}

impl Progress for StdoutProgress {
    fn mark(&mut self, mark: Mark) {
        print!("{}", mark.symbol());
        let _ = std::io::stdout().flush();
        self.printed = true;
    }

    fn finish(&mut self) {
        if self.printed {
            println!();
            self.printed = false;
        }
    }
}

/// Fetch, check, sleep; repeat until `check` breaks.
///
/// The first fetch happens immediately.
pub async fn poll_until<T, E, R, F, Fut, C>(
    interval: Duration,
    progress: &mut dyn Progress,
    mut fetch: F,
    mut check: C,
) -> R
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: FnMut(T) -> ControlFlow<R>,
{
    loop {
        match fetch().await {
            Ok(value) => match check(value) {
                ControlFlow::Break(result) => {
                    progress.finish();
                    return result;
                }
                ControlFlow::Continue(()) => progress.mark(Mark::Waiting),
            },
            Err(err) => {
                debug!(error = %err, "poll attempt failed");
                progress.mark(Mark::Failed);
            }
        }
        tokio::time::sleep(interval).await;
    }
}

/// Stop on approval or a terminal status, keep waiting otherwise
pub fn kyc_verdict(reply: &KycResponse) -> ControlFlow<Result<KycStatus, SetupError>> {
    if reply.status.is_approved() {
        return ControlFlow::Break(Ok(reply.status));
    }
    if reply.status.is_terminal() {
        return ControlFlow::Break(Err(SetupError::Kyc {
            status: reply.status,
            reason: reply.reason.clone().unwrap_or_else(|| "unknown".to_string()),
        }));
    }
    ControlFlow::Continue(())
}

/// Stop at the first strictly positive balance
pub fn funding_verdict(balance: BalanceResponse) -> ControlFlow<BalanceResponse> {
    if balance.is_funded() {
        ControlFlow::Break(balance)
    } else {
        ControlFlow::Continue(())
    }
}
