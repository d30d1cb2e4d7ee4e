use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::kv::KeyValueStore;

pub const AUTH_KEY: &str = "auth";

/// Persisted login state. Both flags default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthState {
    pub is_authenticated: bool,
    pub biometrics_enabled: bool,
}

impl AuthState {
    pub const LOGGED_OUT: AuthState = AuthState {
        is_authenticated: false,
        biometrics_enabled: false,
    };
}

/// Reads and writes [`AuthState`] under a single key.
#[derive(Clone)]
pub struct AuthStateStore {
    store: Arc<dyn KeyValueStore>,
}

impl AuthStateStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> Result<AuthState> {
        match self.store.get(AUTH_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).context("Stored auth state is not valid JSON"),
            None => Ok(AuthState::default()),
        }
    }

    pub async fn save(&self, state: AuthState) -> Result<()> {
        let json = serde_json::to_string(&state).context("Failed to encode auth state")?;
        self.store.set(AUTH_KEY, &json).await
    }
}
