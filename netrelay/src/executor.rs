//! Command execution and response classification.
//!
//! The device has no structured error channel, so rejection is detected by
//! looking for marker text (by default `Invalid`, as in IOS's
//! `% Invalid input detected`) anywhere in the raw response. This is a
//! best-effort heuristic: a response that happens to contain a marker in
//! ordinary output is misclassified as rejected.

use std::time::Duration;

use log::{debug, warn};
use memchr::memmem;

use crate::command::{CommandSequence, ShowCommand};
use crate::error::{Error, Result, TransportError};
use crate::session::{Session, SessionGuard};

/// Default rejection marker.
pub const DEFAULT_REJECTION_MARKER: &str = "Invalid";

/// Classified device response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No rejection marker. May be empty for show commands whose feature
    /// has nothing to report yet.
    Success(String),
    /// A rejection marker was found.
    Rejected(String),
}

impl Outcome {
    /// The raw device text.
    pub fn raw(&self) -> &str {
        match self {
            Outcome::Success(raw) | Outcome::Rejected(raw) => raw,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Success with nothing but whitespace in the output.
    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Success(raw) if raw.trim().is_empty())
    }

    /// Turn a rejection into [`Error::Rejected`].
    pub fn into_result(self) -> Result<String> {
        match self {
            Outcome::Success(raw) => Ok(raw),
            Outcome::Rejected(output) => Err(Error::Rejected { output }),
        }
    }
}

/// Classify `raw` as rejected if it contains any of `markers`.
pub fn classify<M: AsRef<str>>(raw: &str, markers: &[M]) -> Outcome {
    let rejected = markers
        .iter()
        .any(|m| memmem::find(raw.as_bytes(), m.as_ref().as_bytes()).is_some());
    if rejected {
        Outcome::Rejected(raw.to_string())
    } else {
        Outcome::Success(raw.to_string())
    }
}

/// Runs commands on a session and always closes it afterwards.
#[derive(Debug, Clone)]
pub struct Executor {
    timeout: Duration,
    markers: Vec<String>,
}

impl Executor {
    /// Create an executor whose operations are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            markers: vec![DEFAULT_REJECTION_MARKER.to_string()],
        }
    }

    /// Replace the rejection markers.
    pub fn with_markers<I, M>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        self.markers = markers.into_iter().map(Into::into).collect();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Submit a configuration sequence, then close the session.
    pub async fn configure<S: Session>(
        &self,
        mut guard: SessionGuard<S>,
        commands: &CommandSequence,
    ) -> Result<Outcome> {
        debug!(
            "Submitting {} config line(s) to {}",
            commands.len(),
            guard.host()
        );
        let result = match guard.session_mut() {
            Ok(session) => tokio::time::timeout(self.timeout, session.run_batch(commands)).await,
            Err(e) => Ok(Err(e)),
        };
        self.finish(guard, result).await
    }

    /// Run one exec-mode command, then close the session.
    pub async fn show<S: Session>(
        &self,
        mut guard: SessionGuard<S>,
        command: &ShowCommand,
    ) -> Result<Outcome> {
        let line = command.command();
        debug!("Running '{}' on {}", line, guard.host());
        let result = match guard.session_mut() {
            Ok(session) => tokio::time::timeout(self.timeout, session.run(&line)).await,
            Err(e) => Ok(Err(e)),
        };
        self.finish(guard, result).await
    }

    async fn finish<S: Session>(
        &self,
        guard: SessionGuard<S>,
        result: std::result::Result<Result<String>, tokio::time::error::Elapsed>,
    ) -> Result<Outcome> {
        let host = guard.host().to_string();
        guard.close().await;
        let raw = result.map_err(|_| {
            warn!("Command on {} timed out after {:?}", host, self.timeout);
            TransportError::Timeout(self.timeout)
        })??;
        let outcome = classify(&raw, self.markers.as_slice());
        if !outcome.is_success() {
            warn!("Device {} rejected the command", host);
        }
        Ok(outcome)
    }
}
