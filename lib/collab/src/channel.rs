//! Reconnecting collaboration channel.
//!
//! [`CollabChannel::open`] spawns one task that owns the connection:
//!
//! ```text
//! Connecting ──ok──▶ Connected ──drop──▶ Connecting
//!     │                  │
//!     └─max failures─▶ Error ──reconnect()──▶ Connecting
//!                        │
//!              close() ──┴──▶ Disconnected
//! ```
//!
//! After the n-th consecutive failed attempt the task waits
//! `base_delay * 2^(n-1)` before trying again. Once `max_attempts` attempts
//! have failed it stops and stays in `Error` until [`CollabChannel::reconnect`]
//! is called. Broadcasts made while not connected are queued and flushed on
//! the next successful connect. Closing while a connect is in flight waits a
//! few seconds for it so queued broadcasts still go out.

use crate::error::{ChannelError, TransportError};
use crate::hub::{Subscription, SubscriptionHub};
use crate::message::WireMessage;
use crate::presence::Presence;
use crate::transport::{Connection, Transport};
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

/// Most broadcasts held while disconnected; the oldest are dropped first.
const OUTBOX_CAPACITY: usize = 256;

/// How long a close waits for an in-flight connect to deliver queued
/// broadcasts.
const CLOSE_GRACE: Duration = Duration::from_secs(5);

/// Connection status as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    /// Retries are exhausted; only an explicit reconnect leaves this state.
    Error,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub base_delay: Duration,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(1000),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    #[must_use]
    pub fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts,
        }
    }

    /// Delay after the given number of consecutive failures.
    #[must_use]
    pub fn delay_after(&self, failures: u32) -> Duration {
        let factor = 2u32.saturating_pow(failures.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

enum Command {
    Send(WireMessage),
    Reconnect,
    Close,
}

/// Handle to a running collaboration channel.
///
/// Dropping the handle stops the connection task.
pub struct CollabChannel {
    hub: SubscriptionHub,
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<ConnectionStatus>,
    presence: watch::Receiver<Presence>,
    task: JoinHandle<()>,
}

impl fmt::Debug for CollabChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollabChannel")
            .field("status", &*self.status.borrow())
            .finish_non_exhaustive()
    }
}

impl CollabChannel {
    /// Starts connecting in the background. Must be called within a tokio
    /// runtime.
    #[must_use]
    pub fn open(transport: Arc<dyn Transport>, policy: ReconnectPolicy) -> Self {
        let hub = SubscriptionHub::new();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connecting);
        let (presence_tx, presence_rx) = watch::channel(Presence::new());

        let worker = Worker {
            transport,
            policy,
            hub: hub.clone(),
            presence: presence_tx,
            status: status_tx,
            commands: commands_rx,
            outbox: VecDeque::new(),
        };
        let task = tokio::spawn(worker.run());

        Self {
            hub,
            commands: commands_tx,
            status: status_rx,
            presence: presence_rx,
            task,
        }
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    /// Returns a receiver that observes every status change.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    /// Subscribes to incoming messages for an event name, or `"*"` for all.
    #[must_use]
    pub fn subscribe(&self, event: impl Into<String>) -> Subscription {
        self.hub.subscribe(event)
    }

    /// Online collaborators, sorted.
    #[must_use]
    pub fn online_users(&self) -> Vec<String> {
        self.presence.borrow().online_users()
    }

    /// Queues a message for every collaborator.
    ///
    /// # Errors
    ///
    /// Returns `Closed` if the connection task has exited.
    pub fn broadcast(&self, event: impl Into<String>, data: Value) -> Result<(), Report<ChannelError>> {
        self.commands
            .send(Command::Send(WireMessage::new(event, data)))
            .map_err(|_| ChannelError::Closed)?;
        Ok(())
    }

    /// Starts a fresh connection cycle after retries were exhausted.
    ///
    /// # Errors
    ///
    /// Returns `Closed` if the connection task has exited.
    pub fn reconnect(&self) -> Result<(), Report<ChannelError>> {
        self.commands
            .send(Command::Reconnect)
            .map_err(|_| ChannelError::Closed)?;
        Ok(())
    }

    /// Closes the connection and waits for the task to finish.
    pub async fn close(self) {
        let _ = self.commands.send(Command::Close);
        if let Err(e) = self.task.await {
            error!(error = %e, "collaboration task failed");
        }
    }
}

enum Wake {
    Elapsed,
    Reconnect,
    Close,
}

struct Worker {
    transport: Arc<dyn Transport>,
    policy: ReconnectPolicy,
    hub: SubscriptionHub,
    presence: watch::Sender<Presence>,
    status: watch::Sender<ConnectionStatus>,
    commands: mpsc::UnboundedReceiver<Command>,
    outbox: VecDeque<WireMessage>,
}

impl Worker {
    async fn run(mut self) {
        while let Some(mut connection) = self.establish().await {
            let closing = self.serve(connection.as_mut()).await;
            if closing {
                connection.close().await;
                break;
            }
        }
        if !self.outbox.is_empty() {
            warn!(dropped = self.outbox.len(), "closing with undelivered broadcasts");
            self.outbox.clear();
        }
        self.set_status(ConnectionStatus::Disconnected);
        info!("collaboration channel closed");
    }

    /// Connects with bounded retries. Returns `None` once the channel is
    /// closing.
    async fn establish(&mut self) -> Option<Box<dyn Connection>> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut failures = 0;

        loop {
            self.set_status(ConnectionStatus::Connecting);
            let transport = Arc::clone(&self.transport);
            let mut connect = transport.connect();
            let attempt = tokio::select! {
                result = &mut connect => result,
                wake = self.idle(None) => match wake {
                    Wake::Close => {
                        if !self.outbox.is_empty() {
                            self.flush_on_close(connect).await;
                        }
                        return None;
                    }
                    Wake::Elapsed | Wake::Reconnect => continue,
                },
            };

            match attempt {
                Ok(connection) => return Some(connection),
                Err(err) => {
                    failures += 1;
                    warn!(attempt = failures, max_attempts, error = %err, "connection attempt failed");
                }
            }

            if failures >= max_attempts {
                self.set_status(ConnectionStatus::Error);
                error!(attempts = failures, "giving up on collaboration server");
                match self.idle(None).await {
                    Wake::Close => return None,
                    Wake::Elapsed | Wake::Reconnect => {
                        info!("reconnect requested");
                        failures = 0;
                    }
                }
            } else {
                let delay = self.policy.delay_after(failures);
                debug!(delay_ms = delay.as_millis() as u64, "waiting before reconnect");
                if let Wake::Close = self.idle(Some(delay)).await {
                    return None;
                }
            }
        }
    }

    /// Waits for the delay (forever when `None`) while queueing broadcasts.
    async fn idle(&mut self, delay: Option<Duration>) -> Wake {
        let sleep = async {
            match delay {
                Some(delay) => tokio::time::sleep(delay).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                () = &mut sleep => return Wake::Elapsed,
                command = self.commands.recv() => match command {
                    Some(Command::Send(message)) => self.queue(message),
                    Some(Command::Reconnect) => return Wake::Reconnect,
                    Some(Command::Close) | None => return Wake::Close,
                },
            }
        }
    }

    /// Lets a connect that was in flight when the channel closed finish, then
    /// sends the queued broadcasts on it.
    async fn flush_on_close(
        &mut self,
        connect: impl Future<Output = Result<Box<dyn Connection>, Report<TransportError>>>,
    ) {
        match tokio::time::timeout(CLOSE_GRACE, connect).await {
            Ok(Ok(mut connection)) => {
                let queued = self.outbox.len();
                if self.flush(connection.as_mut()).await {
                    debug!(queued, "flushed queued broadcasts before closing");
                }
                connection.close().await;
            }
            Ok(Err(err)) => warn!(error = %err, "connect failed while closing"),
            Err(_) => warn!(grace_ms = CLOSE_GRACE.as_millis() as u64, "connect still pending at close"),
        }
    }

    /// Sends queued broadcasts in order. Returns false if a send failed; the
    /// failed message stays queued.
    async fn flush(&mut self, connection: &mut dyn Connection) -> bool {
        while let Some(message) = self.outbox.pop_front() {
            if let Err(err) = connection.send(&message).await {
                warn!(error = %err, "failed to flush queued message");
                self.outbox.push_front(message);
                return false;
            }
        }
        true
    }

    /// Pumps messages both ways. Returns true when the channel is closing,
    /// false when the connection was lost.
    async fn serve(&mut self, connection: &mut dyn Connection) -> bool {
        self.set_status(ConnectionStatus::Connected);

        if !self.flush(connection).await {
            return false;
        }

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Send(message)) => {
                        if let Err(err) = connection.send(&message).await {
                            warn!(error = %err, "send failed, reconnecting");
                            self.outbox.push_front(message);
                            return false;
                        }
                    }
                    Some(Command::Reconnect) => debug!("already connected"),
                    Some(Command::Close) | None => return true,
                },
                incoming = connection.next() => match incoming {
                    Some(Ok(message)) => self.deliver(&message),
                    Some(Err(err)) => {
                        warn!(error = %err, "connection lost");
                        return false;
                    }
                    None => {
                        info!("connection closed by server");
                        return false;
                    }
                },
            }
        }
    }

    fn deliver(&self, message: &WireMessage) {
        self.presence
            .send_if_modified(|presence| presence.apply(message));
        let delivered = self.hub.publish(message);
        trace!(event = %message.event, delivered, "message received");
    }

    fn queue(&mut self, message: WireMessage) {
        if self.outbox.len() >= OUTBOX_CAPACITY {
            if let Some(dropped) = self.outbox.pop_front() {
                warn!(event = %dropped.event, "outbox full, dropping oldest message");
            }
        }
        self.outbox.push_back(message);
    }

    fn set_status(&self, status: ConnectionStatus) {
        let previous = self.status.send_replace(status);
        if previous != status {
            debug!(%previous, %status, "connection status changed");
        }
    }
}
