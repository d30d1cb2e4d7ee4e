//! Device capabilities the app consumes but does not implement itself.
//!
//! Each capability is a narrow async trait so the auth gate and the screens
//! can be exercised against fakes. [`terminal`] holds the implementations
//! used by the binary.

pub mod terminal;

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::util::UrlValidationError;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("{0} is not available on this device")]
    Unavailable(&'static str),
    #[error("Invalid link: {0}")]
    InvalidUrl(#[from] UrlValidationError),
    #[error("Download failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Download failed: server returned {0}")]
    HttpStatus(u16),
    #[error("Download too large (exceeds {0} bytes)")]
    TooLarge(usize),
    #[error("{0:#}")]
    File(anyhow::Error),
    #[error("Could not open browser: {0}")]
    Launch(std::io::Error),
}

/// Biometric hardware as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiometricKind {
    Face,
    Fingerprint,
    Generic,
}

impl BiometricKind {
    pub fn label(self) -> &'static str {
        match self {
            BiometricKind::Face => "Face unlock",
            BiometricKind::Fingerprint => "Fingerprint",
            BiometricKind::Generic => "Biometrics",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiometricAvailability {
    /// Hardware present and at least one credential enrolled.
    pub available: bool,
    /// Display-only.
    pub kind: Option<BiometricKind>,
}

impl BiometricAvailability {
    pub const UNAVAILABLE: BiometricAvailability = BiometricAvailability {
        available: false,
        kind: None,
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub title: String,
    pub url: String,
}

#[async_trait]
pub trait BiometricCheck: Send + Sync {
    async fn availability(&self) -> BiometricAvailability;
}

#[async_trait]
pub trait BiometricPrompt: Send + Sync {
    /// Run the biometric challenge (device passcode fallback allowed).
    /// `Ok(false)` means the user failed or cancelled.
    async fn authenticate(&self, reason: &str) -> Result<bool, PlatformError>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn schedule(&self, notification: Notification) -> Result<(), PlatformError>;
}

#[async_trait]
pub trait FileDownloader: Send + Sync {
    /// Fetch `url` and store it locally, returning where it was written.
    async fn download(&self, url: &str, suggested_name: &str) -> Result<PathBuf, PlatformError>;
}

#[async_trait]
pub trait ShareSheet: Send + Sync {
    async fn share(&self, request: &ShareRequest) -> Result<(), PlatformError>;
}

#[async_trait]
pub trait DocumentPicker: Send + Sync {
    /// `Ok(None)` when the user picked nothing.
    async fn pick(&self) -> Result<Option<PathBuf>, PlatformError>;
}
