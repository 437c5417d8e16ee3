//! Credential scopes
//!
//! A platform key carries its scope in its prefix. Owner keys manage the
//! account and its cards; agent keys are bound to a single card and can only
//! read balances, card details and history, or ask for a spend check.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scope of a platform credential, derived from its prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialScope {
    /// Account-wide key (`sk_live_...`)
    Owner,
    /// Card-scoped key (`sk_agent_...`)
    Agent,
}

impl CredentialScope {
    /// Key prefix identifying this scope
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Owner => "sk_live_",
            Self::Agent => "sk_agent_",
        }
    }

    /// Whether `key` belongs to this scope
    pub fn admits(self, key: &str) -> bool {
        key.starts_with(self.prefix())
    }

    /// Detect the scope of a key, if it has a known prefix
    pub fn of(key: &str) -> Option<Self> {
        [Self::Owner, Self::Agent]
            .into_iter()
            .find(|scope| scope.admits(key))
    }
}

impl fmt::Display for CredentialScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Agent => write!(f, "agent"),
        }
    }
}

/// Mask a key for logs and debug output, keeping the prefix and last 4 chars
pub fn redact_key(key: &str) -> String {
    let prefix = CredentialScope::of(key).map(|s| s.prefix()).unwrap_or("");
    let rest = &key[prefix.len()..];
    let chars: Vec<char> = rest.chars().collect();
    if chars.len() <= 4 {
        return format!("{prefix}****");
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}****{tail}")
}
