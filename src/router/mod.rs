//! Message router
//!
//! A [`Router`] owns the set of registered mailboxes and runs a single
//! routing loop that serializes every delivery decision. Producers hand
//! messages to the loop through a bounded inbound queue; the loop resolves
//! the target mailbox(es) under a shared read of the registration map and
//! performs a non-blocking enqueue into each one.
//!
//! # Lock discipline
//!
//! The registration map is `RwLock<HashMap<String, MailboxSender>>`.
//! The routing loop takes the read form while resolving a message;
//! [`Router::register`] and [`Router::unregister`] take the write form. Each
//! mailbox is single-writer (the loop) and single-reader (its consumer), so
//! nothing beyond the channel itself guards its queue.
//!
//! # Backpressure
//!
//! - Inbound queue full: [`Router::submit`] waits for space.
//! - Mailbox full: the message is dropped for that recipient only.
//!
//! The loop itself never waits on a consumer.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod mailbox;
pub mod message;

pub use config::RouterConfig;
pub use dispatch::{Router, RouterState};
pub use error::RouterError;
pub use mailbox::{Mailbox, MailboxSender, Offer};
pub use message::{Message, Target};
