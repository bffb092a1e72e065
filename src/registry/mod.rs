//! Identity registry for admission control
//!
//! The registry holds the authoritative mapping from a user id to a validated
//! [`User`] record. A record is admitted only if it passes structural
//! validation and its id is not already taken; records are immutable once
//! admitted (remove and re-add to change fields).
//!
//! The registry is independent of message routing: it has its own lock
//! domain and never touches the router's mailbox map. Callers typically admit
//! a user here before registering a mailbox for them with the router.

pub mod error;
pub mod store;
pub mod user;

pub use error::RegistryError;
pub use store::UserRegistry;
pub use user::{User, ValidationError};
