//! Session lifecycle around a management connection.
//!
//! A [`Session`] owns at most one live [`ManagementClient`] and guards
//! the connect/disconnect protocol: connecting twice or operating with
//! no session in progress is a [`Error::Context`]. Connection attempts
//! retry transient failures with bounded exponential backoff; observers
//! subscribe to lifecycle events.

use std::thread;
use std::time::Duration;

use crate::client::ManagementClient;
use crate::error::{Error, Result};

/// Lifecycle notifications published to session listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected { mode: String },
    Disconnected { mode: String },
}

/// Observer of session lifecycle changes.
pub trait SessionListener {
    fn on_configuration_changed(&self, event: &SessionEvent);
}

/// Produces a connected client for one connection mode.
pub trait Connector {
    /// Connection mode label used in events and diagnostics
    /// (e.g. `standalone`, `embedded`).
    fn mode(&self) -> &str;

    /// Attempt to establish the connection.
    fn connect(&mut self) -> Result<Box<dyn ManagementClient>>;
}

/// Bounded exponential backoff for connection attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff_factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_secs(2),
            backoff_factor: 2,
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following `attempt` (1-based):
    /// base, base*factor, base*factor^2, ...
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        self.base_delay * self.backoff_factor.saturating_pow(exponent)
    }
}

/// An explicit session value.
///
/// There is deliberately no process-global session; callers construct
/// one and pass it (or the client borrowed from it) where needed.
pub struct Session {
    client: Option<Box<dyn ManagementClient>>,
    mode: Option<String>,
    listeners: Vec<Box<dyn SessionListener>>,
    retry: RetryPolicy,
}

impl Session {
    pub fn new() -> Self {
        Self::with_retry(RetryPolicy::default())
    }

    pub fn with_retry(retry: RetryPolicy) -> Self {
        Self {
            client: None,
            mode: None,
            listeners: Vec::new(),
            retry,
        }
    }

    /// Register a lifecycle observer.
    pub fn subscribe(&mut self, listener: Box<dyn SessionListener>) {
        self.listeners.push(listener);
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Borrow the active client.
    pub fn client(&self) -> Result<&dyn ManagementClient> {
        self.client
            .as_deref()
            .ok_or_else(|| Error::Context("no session in progress".to_string()))
    }

    /// Establish a connection through `connector`.
    ///
    /// Only connection-level failures are retried; the final attempt's
    /// error is surfaced as-is.
    pub fn connect(&mut self, connector: &mut dyn Connector) -> Result<()> {
        if self.client.is_some() {
            return Err(Error::Context(
                "session already in progress, disconnect first".to_string(),
            ));
        }
        let mode = connector.mode().to_string();
        let mut attempt = 1;
        let client = loop {
            match connector.connect() {
                Ok(client) => break client,
                Err(err) if err.is_retryable() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    log::warn!(
                        "connection attempt {attempt}/{} to {mode} server failed ({err}), retrying in {delay:?}",
                        self.retry.max_attempts
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        };
        self.client = Some(client);
        self.mode = Some(mode.clone());
        self.publish(&SessionEvent::Connected { mode });
        Ok(())
    }

    /// Tear down the active session.
    pub fn disconnect(&mut self) -> Result<()> {
        if self.client.take().is_none() {
            return Err(Error::Context("no session in progress".to_string()));
        }
        let mode = self.mode.take().unwrap_or_default();
        self.publish(&SessionEvent::Disconnected { mode });
        Ok(())
    }

    fn publish(&self, event: &SessionEvent) {
        for listener in &self.listeners {
            listener.on_configuration_changed(event);
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
