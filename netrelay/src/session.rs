//! Remote management session capability.
//!
//! [`Connector`] opens a [`Session`] from a stored credential. The relay
//! never keeps a session beyond one request: it is wrapped in a
//! [`SessionGuard`] as soon as it opens, and the guard closes it on every
//! exit path.

use std::future::Future;

use log::{debug, warn};

use crate::error::{ChannelError, Result};
use crate::registry::DeviceCredential;

/// A live, authenticated CLI session on one device.
pub trait Session: Send + 'static {
    /// Run one command in exec mode and return its output, with the command
    /// echo and trailing prompt removed.
    fn run(&mut self, command: &str) -> impl Future<Output = Result<String>> + Send;

    /// Submit configuration lines in order inside configuration mode and
    /// return the device's full transcript.
    fn run_batch(&mut self, commands: &[String]) -> impl Future<Output = Result<String>> + Send;

    /// Close the session.
    fn close(self) -> impl Future<Output = Result<()>> + Send
    where
        Self: Sized;
}

/// Opens sessions to devices.
pub trait Connector: Send + Sync {
    type Session: Session;

    /// Connect and authenticate with `credential`.
    fn open(
        &self,
        credential: &DeviceCredential,
    ) -> impl Future<Output = Result<Self::Session>> + Send;
}

/// Owns an open session for the duration of one request.
///
/// Call [`close`](Self::close) when done. A guard dropped while still open
/// (early return, panic, cancelled future) schedules the close on the
/// current tokio runtime instead.
pub struct SessionGuard<S: Session> {
    session: Option<S>,
    host: String,
}

impl<S: Session> std::fmt::Debug for SessionGuard<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("host", &self.host)
            .field("open", &self.session.is_some())
            .finish()
    }
}

impl<S: Session> SessionGuard<S> {
    pub fn new(session: S, host: impl Into<String>) -> Self {
        Self {
            session: Some(session),
            host: host.into(),
        }
    }

    /// The device this session is connected to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Borrow the open session.
    pub fn session_mut(&mut self) -> Result<&mut S> {
        Ok(self.session.as_mut().ok_or(ChannelError::NotOpen)?)
    }

    /// Close the session. Close failures are logged, not returned: the
    /// request's own outcome is what the caller needs.
    pub async fn close(mut self) {
        if let Some(session) = self.session.take() {
            match session.close().await {
                Ok(()) => debug!("Closed session to {}", self.host),
                Err(e) => warn!("Error closing session to {}: {}", self.host, e),
            }
        }
    }
}

impl<S: Session> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        warn!(
            "Session to {} dropped without close, closing in background",
            self.host
        );
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let host = std::mem::take(&mut self.host);
                handle.spawn(async move {
                    if let Err(e) = session.close().await {
                        warn!("Background close of session to {} failed: {}", host, e);
                    }
                });
            }
            Err(_) => warn!("No runtime to close session to {}", self.host),
        }
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Scripted in-memory session for registry, executor and relay tests.

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use crate::error::TransportError;

    /// What the mock device saw.
    #[derive(Debug, Default)]
    pub struct Transcript {
        pub runs: Vec<String>,
        pub batches: Vec<Vec<String>>,
        pub opens: usize,
        pub closes: usize,
    }

    /// Replies served in order; when exhausted, `default_reply` is used.
    #[derive(Clone, Default)]
    pub struct MockConnector {
        pub transcript: Arc<Mutex<Transcript>>,
        pub replies: Arc<Mutex<VecDeque<String>>>,
        pub default_reply: String,
        pub fail_open: bool,
        pub delay: Option<Duration>,
        pub in_flight: Arc<AtomicUsize>,
    }

    impl MockConnector {
        pub fn new(default_reply: &str) -> Self {
            Self {
                default_reply: default_reply.to_string(),
                ..Default::default()
            }
        }

        pub fn reply(self, reply: &str) -> Self {
            self.replies.lock().unwrap().push_back(reply.to_string());
            self
        }

        pub fn opens(&self) -> usize {
            self.transcript.lock().unwrap().opens
        }

        pub fn closes(&self) -> usize {
            self.transcript.lock().unwrap().closes
        }

        /// Sessions opened and not yet closed.
        pub fn in_flight(&self) -> usize {
            self.in_flight.load(Ordering::SeqCst)
        }
    }

    pub struct MockSession {
        connector: MockConnector,
    }

    impl MockSession {
        async fn next_reply(&self) -> String {
            if let Some(delay) = self.connector.delay {
                tokio::time::sleep(delay).await;
            }
            self.connector
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.connector.default_reply.clone())
        }
    }

    impl Connector for MockConnector {
        type Session = MockSession;

        async fn open(&self, _credential: &DeviceCredential) -> Result<MockSession> {
            if self.fail_open {
                return Err(TransportError::AuthenticationFailed {
                    user: "mock".into(),
                }
                .into());
            }
            self.transcript.lock().unwrap().opens += 1;
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            Ok(MockSession {
                connector: self.clone(),
            })
        }
    }

    impl Session for MockSession {
        async fn run(&mut self, command: &str) -> Result<String> {
            self.connector
                .transcript
                .lock()
                .unwrap()
                .runs
                .push(command.to_string());
            Ok(self.next_reply().await)
        }

        async fn run_batch(&mut self, commands: &[String]) -> Result<String> {
            self.connector
                .transcript
                .lock()
                .unwrap()
                .batches
                .push(commands.to_vec());
            Ok(self.next_reply().await)
        }

        async fn close(self) -> Result<()> {
            self.connector.transcript.lock().unwrap().closes += 1;
            self.connector.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
