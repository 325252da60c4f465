//! Endpoint health probe
//!
//! Issues sequential GET requests until one answers 200 or the attempt budget
//! runs out, pausing a fixed second between attempts.

use crate::crawler::fetcher::describe_transport_error;
use chrono::{DateTime, SubsecRound, Utc};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Attempts made when the caller has no preference
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Pause between two consecutive failed attempts
pub const RETRY_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    Healthy,
    Unhealthy,
}

/// Outcome of one [`HealthChecker::check`] call
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: Health,
    /// Wall-clock duration of the last attempt that got a response (seconds)
    pub response_time: Option<f64>,
    pub status_code: Option<u16>,
    pub error: Option<String>,
    /// Captured once when the check starts, second resolution
    pub timestamp: DateTime<Utc>,
    pub attempts: u32,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == Health::Healthy
    }
}

/// Probes a URL with bounded retries
pub struct HealthChecker {
    client: Client,
}

impl HealthChecker {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Checks `url` up to `max_retries` times, each attempt bounded by `timeout`
    ///
    /// Stops at the first 200. Otherwise returns the status observed on the
    /// last attempt. A `max_retries` of 0 still makes one attempt.
    pub async fn check(&self, url: &str, max_retries: u32, timeout: Duration) -> HealthStatus {
        let max_attempts = max_retries.max(1);
        let mut status = HealthStatus {
            status: Health::Unhealthy,
            response_time: None,
            status_code: None,
            error: None,
            timestamp: Utc::now().trunc_subsecs(0),
            attempts: 0,
        };

        for attempt in 1..=max_attempts {
            status.attempts = attempt;
            let started = Instant::now();

            match self.client.get(url).timeout(timeout).send().await {
                Ok(response) if response.status() == StatusCode::OK => {
                    status.status = Health::Healthy;
                    status.response_time = Some(started.elapsed().as_secs_f64());
                    status.status_code = Some(StatusCode::OK.as_u16());
                    status.error = None;
                    tracing::debug!("{} healthy after {} attempt(s)", url, attempt);
                    return status;
                }
                Ok(response) => {
                    let code = response.status().as_u16();
                    status.status = Health::Unhealthy;
                    status.response_time = Some(started.elapsed().as_secs_f64());
                    status.status_code = Some(code);
                    status.error = Some(format!("unexpected status {}", code));
                }
                Err(e) => {
                    status.status = Health::Unhealthy;
                    status.response_time = None;
                    status.status_code = None;
                    status.error = Some(describe_transport_error(&e));
                }
            }

            tracing::debug!(
                "Health attempt {}/{} for {} failed: {}",
                attempt,
                max_attempts,
                url,
                status.error.as_deref().unwrap_or("unknown error")
            );

            if attempt < max_attempts {
                tokio::time::sleep(RETRY_PAUSE).await;
            }
        }

        tracing::warn!(
            "{} unhealthy after {} attempt(s): {}",
            url,
            max_attempts,
            status.error.as_deref().unwrap_or("unknown error")
        );
        status
    }
}
