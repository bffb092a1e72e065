//! Per-recipient bounded mailboxes
//!
//! A mailbox is split in two halves: the router keeps the [`MailboxSender`]
//! in its registration map and offers messages without ever waiting, while
//! the recipient's delivery task owns the [`Mailbox`] and drains it.
//!
//! Closing a mailbox (unregister, replacement, or router shutdown) discards
//! whatever is still pending: reads return `None` from then on.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

use super::message::Message;

/// Create a connected mailbox pair for `user_id`
///
/// A capacity of 0 is treated as 1.
pub fn mailbox(user_id: impl Into<String>, capacity: usize) -> (MailboxSender, Mailbox) {
    let capacity = capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity);
    let closed = CancellationToken::new();

    let sender = MailboxSender {
        tx,
        closed: closed.clone(),
    };
    let mailbox = Mailbox {
        user_id: user_id.into(),
        rx,
        closed,
        capacity,
    };

    (sender, mailbox)
}

/// Result of offering a message to a mailbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// Message enqueued
    Delivered,
    /// Mailbox at capacity; message dropped for this recipient
    Full,
    /// Consumer dropped its mailbox; message dropped
    Disconnected,
}

/// Router-side (write) half of a mailbox
#[derive(Debug)]
pub struct MailboxSender {
    tx: mpsc::Sender<Message>,
    closed: CancellationToken,
}

impl MailboxSender {
    /// Enqueue without waiting
    pub fn offer(&self, message: Message) -> Offer {
        match self.tx.try_send(message) {
            Ok(()) => Offer::Delivered,
            Err(TrySendError::Full(_)) => Offer::Full,
            Err(TrySendError::Closed(_)) => Offer::Disconnected,
        }
    }

    /// Close the mailbox; pending messages are discarded by the reader
    pub fn close(&self) {
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled() || self.tx.is_closed()
    }
}

/// Consumer-side (read) half of a mailbox
#[derive(Debug)]
pub struct Mailbox {
    user_id: String,
    rx: mpsc::Receiver<Message>,
    closed: CancellationToken,
    capacity: usize,
}

impl Mailbox {
    /// Id this mailbox was registered under
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Wait for the next message
    ///
    /// Returns `None` once the mailbox is closed.
    pub async fn recv(&mut self) -> Option<Message> {
        if self.closed.is_cancelled() {
            self.discard();
            return None;
        }

        let msg = tokio::select! {
            biased;
            _ = self.closed.cancelled() => None,
            msg = self.rx.recv() => msg,
        };

        if self.closed.is_cancelled() {
            self.discard();
            return None;
        }
        msg
    }

    /// Take the next message if one is pending
    pub fn try_recv(&mut self) -> Option<Message> {
        if self.closed.is_cancelled() {
            self.discard();
            return None;
        }
        self.rx.try_recv().ok()
    }

    /// Number of pending messages (0 once closed)
    pub fn len(&self) -> usize {
        if self.closed.is_cancelled() {
            0
        } else {
            self.rx.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixed capacity chosen at registration
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    fn discard(&mut self) {
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offer_and_recv_in_order() {
        let (tx, mut rx) = mailbox("alice", 4);

        for i in 0..3 {
            let msg = Message::direct("x", "alice", format!("m{}", i));
            assert_eq!(tx.offer(msg), Offer::Delivered);
        }
        assert_eq!(rx.len(), 3);

        for i in 0..3 {
            let msg = rx.recv().await.unwrap();
            assert_eq!(msg.content(), format!("m{}", i));
        }
        assert!(rx.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_offer_full_drops() {
        let (tx, mut rx) = mailbox("bob", 1);

        assert_eq!(tx.offer(Message::broadcast("x", "one")), Offer::Delivered);
        assert_eq!(tx.offer(Message::broadcast("x", "two")), Offer::Full);
        assert_eq!(rx.len(), 1);

        assert_eq!(rx.recv().await.unwrap().content(), "one");
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn test_close_discards_pending() {
        let (tx, mut rx) = mailbox("alice", 2);
        tx.offer(Message::broadcast("x", "pending"));

        tx.close();

        assert!(rx.is_closed());
        assert!(tx.is_closed());
        assert_eq!(rx.len(), 0);
        assert!(rx.recv().await.is_none());
        assert!(rx.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_close_wakes_waiting_reader() {
        let (tx, mut rx) = mailbox("alice", 2);

        let reader = tokio::spawn(async move { rx.recv().await });
        tokio::task::yield_now().await;
        tx.close();

        assert!(reader.await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dropped_consumer() {
        let (tx, rx) = mailbox("alice", 2);
        drop(rx);

        assert_eq!(tx.offer(Message::broadcast("x", "lost")), Offer::Disconnected);
        assert!(tx.is_closed());
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let (_tx, rx) = mailbox("alice", 0);
        assert_eq!(rx.capacity(), 1);
        assert_eq!(rx.user_id(), "alice");
    }
}
