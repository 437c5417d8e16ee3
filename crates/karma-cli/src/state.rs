//! Local setup state
//!
//! A single JSON object mirroring what the platform has told us so far. It
//! only exists so an interrupted setup can resume; the platform remains the
//! source of truth. The file is rewritten wholesale after every step.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use karma_sdk::KycStatus;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// File name under the user's home directory
pub const STATE_FILE_NAME: &str = ".karma-agent.json";

#[derive(Debug, Error)]
pub enum StateError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kyc_status: Option<KycStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kyc_url: Option<String>,
    #[serde(default)]
    pub terms_accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_last4: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_name: Option<String>,
}

impl AgentState {
    pub fn is_registered(&self) -> bool {
        self.owner_key.is_some()
    }

    pub fn kyc_approved(&self) -> bool {
        self.kyc_status.map_or(false, |s| s.is_approved())
    }

    pub fn has_card(&self) -> bool {
        self.agent_key.is_some()
    }

    /// Record a freshly issued (or re-keyed) card
    pub fn record_card(
        &mut self,
        card_id: String,
        agent_key: String,
        deposit_address: String,
        last4: String,
        name: String,
    ) {
        self.card_id = Some(card_id);
        self.agent_key = Some(agent_key);
        self.deposit_address = Some(deposit_address);
        self.card_last4 = Some(last4);
        self.card_name = Some(name);
    }
}

/// Where the state lives on disk
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved state, or the empty state if the file is missing or unreadable
    pub fn load(&self) -> AgentState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    warn!(path = %self.path.display(), error = %err, "could not read state file");
                }
                return AgentState::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(path = %self.path.display(), error = %err, "ignoring malformed state file");
            AgentState::default()
        })
    }

    /// Overwrite the file with `state`
    pub fn save(&self, state: &AgentState) -> Result<(), StateError> {
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// `~/.karma-agent.json`, falling back to the working directory
pub fn default_state_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(STATE_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_loads_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load(), AgentState::default());
    }

    #[test]
    fn test_malformed_file_loads_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(StateStore::new(path).load(), AgentState::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));

        let mut state = AgentState {
            email: Some("ann@example.com".into()),
            owner_key: Some("sk_live_abc".into()),
            kyc_status: Some(KycStatus::Pending),
            ..Default::default()
        };
        store.save(&state).unwrap();
        assert_eq!(store.load(), state);

        state.kyc_status = Some(KycStatus::Approved);
        store.save(&state).unwrap();
        assert!(store.load().kyc_approved());
    }

    #[test]
    fn test_reads_plain_string_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(
            &path,
            r#"{"owner_key":"sk_live_abc","kyc_status":"approved","kyc_url":"https://verify.example/x"}"#,
        )
        .unwrap();

        let state = StateStore::new(path).load();
        assert!(state.is_registered());
        assert!(state.kyc_approved());
        assert!(!state.terms_accepted);
        assert!(!state.has_card());
    }

    #[test]
    fn test_unset_fields_are_not_written() {
        let state = AgentState {
            owner_key: Some("sk_live_abc".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json, serde_json::json!({"owner_key": "sk_live_abc", "terms_accepted": false}));
    }

    #[test]
    fn test_default_path_file_name() {
        assert!(default_state_path().ends_with(STATE_FILE_NAME));
    }
}
