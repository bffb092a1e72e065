//! Router implementation
//!
//! The routing loop, mailbox registration, and the shutdown protocol.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::config::RouterConfig;
use super::error::RouterError;
use super::mailbox::{mailbox, Mailbox, MailboxSender, Offer};
use super::message::Message;
use crate::stats::{RouterStats, RouterStatsSnapshot};

/// Lifecycle of a router
///
/// `Created → Running → ShuttingDown → Closed`. The last two transitions
/// happen exactly once, when the shutdown token fires, and are irreversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    /// Built, loop not started
    Created,
    /// Loop is routing messages
    Running,
    /// Shutdown token observed, mailboxes being closed
    ShuttingDown,
    /// Terminal: all mailboxes closed, submissions rejected
    Closed,
}

/// Central message router
///
/// Share it behind an `Arc`: producers call [`submit`](Self::submit),
/// connection handlers call [`register`](Self::register) and
/// [`unregister`](Self::unregister), and exactly one task drives the loop via
/// [`spawn`](Self::spawn) or [`run`](Self::run).
pub struct Router {
    /// Map of user id to the write half of their mailbox
    mailboxes: RwLock<HashMap<String, MailboxSender>>,

    /// Producer side of the inbound queue
    inbound_tx: mpsc::Sender<Message>,

    /// Consumer side of the inbound queue, taken once by the loop
    inbound_rx: Mutex<Option<mpsc::Receiver<Message>>>,

    /// Published lifecycle state
    state: watch::Sender<RouterState>,

    /// External cancellation signal that triggers shutdown
    shutdown: CancellationToken,

    stats: RouterStats,

    config: RouterConfig,
}

impl Router {
    /// Create a router with default configuration and its own shutdown token
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Create a router with custom configuration and its own shutdown token
    pub fn with_config(config: RouterConfig) -> Self {
        Self::with_shutdown(config, CancellationToken::new())
    }

    /// Create a router that shuts down when `shutdown` is cancelled
    pub fn with_shutdown(config: RouterConfig, shutdown: CancellationToken) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(config.inbound_capacity.max(1));
        let (state, _) = watch::channel(RouterState::Created);

        Self {
            mailboxes: RwLock::new(HashMap::new()),
            inbound_tx,
            inbound_rx: Mutex::new(Some(inbound_rx)),
            state,
            shutdown,
            stats: RouterStats::new(),
            config,
        }
    }

    /// Get the router configuration
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Current lifecycle state
    pub fn state(&self) -> RouterState {
        *self.state.borrow()
    }

    /// Token that triggers shutdown when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Trigger shutdown
    ///
    /// Returns immediately; use [`closed`](Self::closed) to wait for it to
    /// complete.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Wait until the router reaches `Closed`
    ///
    /// Never completes if the loop is never started.
    pub async fn closed(&self) {
        let mut state = self.state.subscribe();
        let _ = state.wait_for(|s| *s == RouterState::Closed).await;
    }

    /// Snapshot of routing counters
    pub fn stats(&self) -> RouterStatsSnapshot {
        self.stats.snapshot()
    }

    /// Submit a message for routing
    ///
    /// Waits while the inbound queue is full. Fails with `Closed` once the
    /// shutdown token has fired, including while waiting for queue space.
    pub async fn submit(&self, message: Message) -> Result<(), RouterError> {
        if self.shutdown.is_cancelled() {
            return Err(RouterError::Closed);
        }

        let state = self.state();
        match state {
            RouterState::Running => {}
            RouterState::Created => return Err(RouterError::NotRunning),
            RouterState::ShuttingDown | RouterState::Closed => return Err(RouterError::Closed),
        }

        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(RouterError::Closed),
            sent = self.inbound_tx.send(message) => sent.map_err(|_| RouterError::Closed),
        }
    }

    /// Register a mailbox for `user_id`
    ///
    /// Replaces (and closes) any existing mailbox for the same id; its pending
    /// messages are lost. Fails with `Closed` once shutdown has begun.
    pub async fn register(
        &self,
        user_id: impl Into<String>,
        capacity: usize,
    ) -> Result<Mailbox, RouterError> {
        let user_id = user_id.into();
        let mut mailboxes = self.mailboxes.write().await;

        // Checked under the write lock so shutdown's drain can't miss an insert
        if self.is_shutting_down() {
            return Err(RouterError::Closed);
        }

        let (tx, mailbox) = mailbox(user_id.clone(), capacity);

        if let Some(previous) = mailboxes.insert(user_id.clone(), tx) {
            previous.close();
            tracing::debug!(user = %user_id, "Replaced existing mailbox");
        }

        tracing::info!(
            user = %user_id,
            capacity = mailbox.capacity(),
            registered = mailboxes.len(),
            "Mailbox registered"
        );

        Ok(mailbox)
    }

    /// Register a mailbox with the configured default capacity
    pub async fn register_default(
        &self,
        user_id: impl Into<String>,
    ) -> Result<Mailbox, RouterError> {
        self.register(user_id, self.config.default_mailbox_capacity)
            .await
    }

    /// Remove and close the mailbox for `user_id`
    ///
    /// Pending messages are discarded. Returns whether a mailbox was removed;
    /// unknown ids (and any call after shutdown) are a no-op.
    pub async fn unregister(&self, user_id: &str) -> bool {
        let mut mailboxes = self.mailboxes.write().await;

        match mailboxes.remove(user_id) {
            Some(tx) => {
                tx.close();
                tracing::info!(
                    user = %user_id,
                    registered = mailboxes.len(),
                    "Mailbox unregistered"
                );
                true
            }
            None => false,
        }
    }

    /// Check if a user currently has a mailbox
    pub async fn is_registered(&self, user_id: &str) -> bool {
        self.mailboxes.read().await.contains_key(user_id)
    }

    /// Number of registered mailboxes
    pub async fn registered_count(&self) -> usize {
        self.mailboxes.read().await.len()
    }

    /// Ids with a registered mailbox, sorted
    pub async fn registered_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.mailboxes.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Run the routing loop on the current task until shutdown
    pub async fn run(&self) -> Result<(), RouterError> {
        let inbound = self.start()?;
        self.event_loop(inbound).await;
        Ok(())
    }

    /// Spawn the routing loop on the tokio runtime
    ///
    /// The router is `Running` as soon as this returns, so submissions made
    /// right after never see `NotRunning`.
    pub fn spawn(self: &Arc<Self>) -> Result<JoinHandle<()>, RouterError> {
        let inbound = self.start()?;
        let router = Arc::clone(self);

        Ok(tokio::spawn(async move {
            router.event_loop(inbound).await;
        }))
    }

    /// Take the inbound receiver and move to `Running`
    fn start(&self) -> Result<mpsc::Receiver<Message>, RouterError> {
        let inbound = self
            .inbound_rx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
            .ok_or(RouterError::AlreadyRunning)?;

        self.state.send_replace(RouterState::Running);
        Ok(inbound)
    }

    fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
            || matches!(
                self.state(),
                RouterState::ShuttingDown | RouterState::Closed
            )
    }

    async fn event_loop(&self, mut inbound: mpsc::Receiver<Message>) {
        tracing::info!(
            inbound_capacity = self.config.inbound_capacity,
            "Router started"
        );

        loop {
            tokio::select! {
                // Shutdown wins even with messages queued
                biased;
                _ = self.shutdown.cancelled() => break,
                msg = inbound.recv() => match msg {
                    Some(msg) => self.route(msg).await,
                    None => break,
                },
            }
        }

        self.close(inbound).await;
    }

    async fn route(&self, message: Message) {
        let mut disconnected = Vec::new();
        let mailboxes = self.mailboxes.read().await;

        match message.recipient() {
            None => {
                for (user_id, tx) in mailboxes.iter() {
                    if !self.deliver(user_id, tx, message.clone()) {
                        disconnected.push(user_id.clone());
                    }
                }
            }
            Some(recipient) => match mailboxes.get(recipient) {
                Some(tx) => {
                    if !self.deliver(recipient, tx, message.clone()) {
                        disconnected.push(recipient.to_string());
                    }
                }
                None => {
                    self.stats.record_dropped_unroutable();
                    tracing::trace!(
                        sender = %message.sender,
                        recipient = %recipient,
                        "Dropped message for unregistered recipient"
                    );
                }
            },
        }
        drop(mailboxes);

        if !disconnected.is_empty() {
            self.prune(&disconnected).await;
        }

        self.stats.record_routed();
    }

    /// Offer to one mailbox; returns `false` if its consumer is gone
    fn deliver(&self, user_id: &str, tx: &MailboxSender, message: Message) -> bool {
        match tx.offer(message) {
            Offer::Delivered => self.stats.record_delivered(),
            Offer::Full => {
                self.stats.record_dropped_full();
                tracing::trace!(user = %user_id, "Dropped message, mailbox full");
            }
            Offer::Disconnected => {
                self.stats.record_dropped_disconnected();
                tracing::trace!(user = %user_id, "Dropped message, consumer gone");
                return false;
            }
        }
        true
    }

    /// Remove mailboxes whose consumer dropped its read half
    async fn prune(&self, user_ids: &[String]) {
        let mut mailboxes = self.mailboxes.write().await;

        for user_id in user_ids {
            // Re-check: the id may have been re-registered since the read lock was released
            if mailboxes.get(user_id).is_some_and(|tx| tx.is_closed()) {
                mailboxes.remove(user_id);
                tracing::debug!(user = %user_id, "Removed mailbox with no consumer");
            }
        }
    }

    async fn close(&self, mut inbound: mpsc::Receiver<Message>) {
        self.state.send_replace(RouterState::ShuttingDown);

        // Producers still waiting for queue space now fail with Closed
        inbound.close();
        let mut discarded = 0u64;
        while inbound.try_recv().is_ok() {
            discarded += 1;
        }
        if discarded > 0 {
            self.stats.record_discarded(discarded);
            tracing::debug!(discarded, "Discarded queued messages on shutdown");
        }

        let closed_mailboxes = {
            let mut mailboxes = self.mailboxes.write().await;
            let count = mailboxes.len();
            for (_, tx) in mailboxes.drain() {
                tx.close();
            }
            count
        };

        self.state.send_replace(RouterState::Closed);

        tracing::info!(mailboxes = closed_mailboxes, discarded, "Router shut down");
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
