//! Shared fixtures for unit tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use karma_sdk::Config;
use tempfile::TempDir;

use crate::poll::{Mark, Progress};
use crate::setup::SetupOptions;

/// Serve `router` on an ephemeral local port
pub(crate) async fn spawn_stub(router: Router) -> Config {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Config::with_base_url(format!("http://{addr}"))
}

/// State file inside `dir`, millisecond polling, no browser
pub(crate) fn options(dir: &TempDir, config: Config) -> SetupOptions {
    SetupOptions {
        config,
        state_path: dir.path().join("karma-agent.json"),
        poll_interval: Duration::from_millis(1),
        open_browser: false,
    }
}

/// Marks readable after the setup that owns the progress sink is done
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedMarks(Arc<Mutex<Vec<Mark>>>);

impl SharedMarks {
    pub fn recorded(&self) -> Vec<Mark> {
        self.0.lock().unwrap().clone()
    }
}

impl Progress for SharedMarks {
    fn mark(&mut self, mark: Mark) {
        self.0.lock().unwrap().push(mark);
    }
}
