//! Concurrent message router
//!
//! Producers submit [`Message`]s to a [`Router`], whose single routing loop
//! decides between direct delivery and broadcast and forwards each message to
//! the bounded [`Mailbox`] of every matching recipient. Mailbox writes never
//! block the loop: a full mailbox drops the message for that recipient only.
//!
//! Identity admission lives in a separate [`UserRegistry`], which validates
//! and deduplicates user records before a client is allowed to register a
//! mailbox.
//!
//! ```text
//!   [Producer] ──submit()──┐
//!   [Producer] ──submit()──┤   inbound mpsc (bounded, awaits when full)
//!                          ▼
//!                 ┌──────────────────┐
//!                 │  routing loop    │◄── CancellationToken
//!                 │  RwLock<HashMap< │
//!                 │   id, Sender>>   │
//!                 └────────┬─────────┘
//!            try_send()    │    (drop on full)
//!          ┌───────────────┼───────────────┐
//!          ▼               ▼               ▼
//!      [Mailbox]       [Mailbox]       [Mailbox]
//!      recv().await    recv().await    recv().await
//! ```

pub mod registry;
pub mod router;
pub mod stats;

pub use registry::{RegistryError, User, UserRegistry, ValidationError};
pub use router::{Mailbox, Message, Router, RouterConfig, RouterError, RouterState, Target};
pub use stats::{RouterStats, RouterStatsSnapshot};
