//! Local login gate.
//!
//! The gate never talks to a server: "logged in" is a persisted flag, set
//! either after a successful biometric challenge or by the plain login path.
//! Storage failures never surface as errors; reads fall back to logged out.

use std::sync::Arc;

use crate::platform::{BiometricAvailability, BiometricCheck, BiometricPrompt};
use crate::storage::{AuthState, AuthStateStore, KeyValueStore};

const PROMPT_REASON: &str = "Log in to newsdesk";

#[derive(Clone)]
pub struct AuthGate {
    store: AuthStateStore,
    check: Arc<dyn BiometricCheck>,
    prompt: Arc<dyn BiometricPrompt>,
}

impl AuthGate {
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        check: Arc<dyn BiometricCheck>,
        prompt: Arc<dyn BiometricPrompt>,
    ) -> Self {
        Self {
            store: AuthStateStore::new(kv),
            check,
            prompt,
        }
    }

    pub async fn check_biometric_availability(&self) -> BiometricAvailability {
        self.check.availability().await
    }

    /// Run the biometric challenge. On success the user is logged in with
    /// biometrics enabled. Failure, cancellation and missing hardware all
    /// return `false` and leave the stored state untouched.
    pub async fn authenticate(&self) -> bool {
        if !self.check_biometric_availability().await.available {
            tracing::debug!("Biometric login requested but not available");
            return false;
        }
        match self.prompt.authenticate(PROMPT_REASON).await {
            Ok(true) => {
                self.persist(AuthState {
                    is_authenticated: true,
                    biometrics_enabled: true,
                })
                .await;
                tracing::info!("Logged in with biometrics");
                true
            }
            Ok(false) => {
                tracing::debug!("Biometric challenge failed or was cancelled");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Biometric challenge error");
                false
            }
        }
    }

    /// Log in without a challenge. Returns `false` if the state could not be saved.
    pub async fn login_without_biometrics(&self) -> bool {
        let saved = self
            .persist(AuthState {
                is_authenticated: true,
                biometrics_enabled: false,
            })
            .await;
        tracing::info!("Logged in without biometrics");
        saved
    }

    /// Always leaves `{false, false}` behind when storage works.
    pub async fn logout(&self) -> bool {
        let saved = self.persist(AuthState::LOGGED_OUT).await;
        tracing::info!("Logged out");
        saved
    }

    pub async fn state(&self) -> AuthState {
        match self.store.load().await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read auth state, treating as logged out");
                AuthState::LOGGED_OUT
            }
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state().await.is_authenticated
    }

    async fn persist(&self, state: AuthState) -> bool {
        match self.store.save(state).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save auth state");
                false
            }
        }
    }
}
