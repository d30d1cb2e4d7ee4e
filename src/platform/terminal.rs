//! Capability implementations for a terminal session.

use async_trait::async_trait;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

use super::{
    BiometricAvailability, BiometricCheck, BiometricPrompt, DocumentPicker, FileDownloader,
    Notification, Notifier, PlatformError, ShareRequest, ShareSheet,
};
use crate::app::AppEvent;
use crate::util::{
    atomic_write, resolve_regular_file, sanitize_file_name, validate_url, validate_url_for_open,
};

/// Default cap for downloaded article pages.
pub const MAX_DOWNLOAD_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Terminals have no biometric hardware: always unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBiometrics;

#[async_trait]
impl BiometricCheck for NoBiometrics {
    async fn availability(&self) -> BiometricAvailability {
        BiometricAvailability::UNAVAILABLE
    }
}

#[async_trait]
impl BiometricPrompt for NoBiometrics {
    async fn authenticate(&self, _reason: &str) -> Result<bool, PlatformError> {
        Err(PlatformError::Unavailable("Biometric authentication"))
    }
}

/// Delivers notifications to the UI loop as status messages once their delay
/// has elapsed.
#[derive(Debug, Clone)]
pub struct StatusNotifier {
    tx: mpsc::Sender<AppEvent>,
}

impl StatusNotifier {
    pub fn new(tx: mpsc::Sender<AppEvent>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Notifier for StatusNotifier {
    async fn schedule(&self, notification: Notification) -> Result<(), PlatformError> {
        let tx = self.tx.clone();
        tracing::debug!(delay_secs = notification.delay.as_secs(), "Scheduling reminder");
        tokio::spawn(async move {
            tokio::time::sleep(notification.delay).await;
            // Receiver gone means the app exited; nothing to deliver to.
            let _ = tx.send(AppEvent::Reminder(notification)).await;
        });
        Ok(())
    }
}

/// Saves article pages into a directory over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: reqwest::Client,
    dir: PathBuf,
    max_bytes: usize,
    allow_private_hosts: bool,
}

impl HttpDownloader {
    pub fn new(dir: PathBuf) -> Result<Self, PlatformError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("newsdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            dir,
            max_bytes: MAX_DOWNLOAD_SIZE,
            allow_private_hosts: false,
        })
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    #[cfg(test)]
    fn allowing_private_hosts(mut self) -> Self {
        self.allow_private_hosts = true;
        self
    }

    /// First free `<name>.html`, `<name>-2.html`, ... in the target directory.
    fn target_path(&self, suggested_name: &str) -> PathBuf {
        let stem = sanitize_file_name(suggested_name);
        let mut candidate = self.dir.join(format!("{stem}.html"));
        let mut n = 2;
        while candidate.exists() {
            candidate = self.dir.join(format!("{stem}-{n}.html"));
            n += 1;
        }
        candidate
    }
}

#[async_trait]
impl FileDownloader for HttpDownloader {
    async fn download(&self, url: &str, suggested_name: &str) -> Result<PathBuf, PlatformError> {
        let url = if self.allow_private_hosts {
            validate_url_for_open(url)?
        } else {
            validate_url(url)?
        };

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlatformError::HttpStatus(status.as_u16()));
        }
        if let Some(len) = response.content_length() {
            if len as usize > self.max_bytes {
                return Err(PlatformError::TooLarge(self.max_bytes));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if bytes.len().saturating_add(chunk.len()) > self.max_bytes {
                return Err(PlatformError::TooLarge(self.max_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PlatformError::File(e.into()))?;
        let path = self.target_path(suggested_name);
        atomic_write(&path, &bytes).map_err(PlatformError::File)?;
        tracing::info!(url = %url, path = %path.display(), bytes = bytes.len(), "Downloaded article");
        Ok(path)
    }
}

/// "Share" on a terminal: open the link in the system browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserShare;

#[async_trait]
impl ShareSheet for BrowserShare {
    async fn share(&self, request: &ShareRequest) -> Result<(), PlatformError> {
        // Validate before open::that(); the URL comes from a third party.
        let url = validate_url_for_open(&request.url)?;
        tokio::task::spawn_blocking(move || open::that(url.as_str()))
            .await
            .map_err(|e| PlatformError::Launch(std::io::Error::other(e)))?
            .map_err(PlatformError::Launch)?;
        tracing::debug!(title = %request.title, "Opened article in browser");
        Ok(())
    }
}

/// Document picker backed by a path given on the command line.
#[derive(Debug, Default, Clone)]
pub struct PathPicker {
    path: Option<PathBuf>,
}

impl PathPicker {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl DocumentPicker for PathPicker {
    async fn pick(&self) -> Result<Option<PathBuf>, PlatformError> {
        match &self.path {
            Some(path) => resolve_regular_file(path)
                .map(Some)
                .map_err(PlatformError::File),
            None => Ok(None),
        }
    }
}
