//! Backend readiness probing.
//!
//! The prober issues a lightweight liveness request on a fixed interval
//! until the backend answers 200 OK, then stops polling permanently. Every
//! failure is swallowed locally and only moves the published tri-state, so
//! probing never propagates errors. Retries are unbounded; teardown happens
//! via [`ReadinessProber::stop`] or drop.

use crate::config::ClientConfig;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Backend reachability as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessState {
    /// No probe has completed yet.
    Checking,
    /// Backend confirmed healthy. Never regresses within a prober lifetime.
    Active,
    /// Probe failed; a warning banner should be visible.
    Inactive,
}

/// Owns the polling task and publishes [`ReadinessState`] on a watch
/// channel.
///
/// Constructed and injected explicitly; dropping it cancels the polling
/// loop, so no probe outlives its owner.
#[derive(Debug)]
pub struct ReadinessProber {
    rx: watch::Receiver<ReadinessState>,
    task: Option<JoinHandle<()>>,
    banner_delay: Duration,
}

impl ReadinessProber {
    /// Start probing `{base}/health`.
    #[must_use]
    pub fn start(http: reqwest::Client, config: &ClientConfig) -> Self {
        let (tx, rx) = watch::channel(ReadinessState::Checking);
        let url = config.health_url();
        let interval = config.health.poll_interval();
        let timeout = config.health.request_timeout();

        let task = tokio::spawn(async move {
            loop {
                if probe(&http, &url, timeout).await {
                    info!("backend ready: {url}");
                    let _ = tx.send(ReadinessState::Active);
                    // Monotone: once active, polling stops for good.
                    break;
                }
                let _ = tx.send(ReadinessState::Inactive);
                tokio::time::sleep(interval).await;
            }
        });

        Self {
            rx,
            task: Some(task),
            banner_delay: config.health.banner_delay(),
        }
    }

    /// The current readiness state.
    #[must_use]
    pub fn state(&self) -> ReadinessState {
        *self.rx.borrow()
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ReadinessState> {
        self.rx.clone()
    }

    /// Wait until the backend is confirmed healthy.
    ///
    /// Also returns when the prober is stopped before reaching `Active`, so
    /// a waiter never outlives the polling loop.
    pub async fn wait_until_active(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|s| *s == ReadinessState::Active).await;
    }

    /// How long a front end should wait before showing the not-ready
    /// banner. Presentation timer only; the probe itself is unaffected.
    #[must_use]
    pub fn banner_delay(&self) -> Duration {
        self.banner_delay
    }

    /// Cancel the polling loop.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ReadinessProber {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn probe(http: &reqwest::Client, url: &str, timeout: Duration) -> bool {
    match http.get(url).timeout(timeout).send().await {
        Ok(response) => response.status().is_success(),
        Err(e) => {
            debug!("health check failed: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[tokio::test]
    async fn stop_is_idempotent() {
        let mut prober = ReadinessProber::start(reqwest::Client::new(), &ClientConfig::default());
        prober.stop();
        prober.stop();
        assert!(prober.task.is_none());
    }

    #[tokio::test]
    async fn banner_delay_comes_from_config() {
        let mut config = ClientConfig::default();
        config.health.banner_delay_ms = 1_234;
        let prober = ReadinessProber::start(reqwest::Client::new(), &config);
        assert_eq!(prober.banner_delay(), Duration::from_millis(1_234));
    }
}
