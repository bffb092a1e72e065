//! Router configuration

/// Default capacity of the inbound queue shared by all producers
pub const DEFAULT_INBOUND_CAPACITY: usize = 100;

/// Default mailbox capacity used by [`Router::register_default`]
///
/// [`Router::register_default`]: super::Router::register_default
pub const DEFAULT_MAILBOX_CAPACITY: usize = 16;

/// Router configuration options
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Inbound queue capacity; producers wait once this many messages are pending
    pub inbound_capacity: usize,

    /// Mailbox capacity for registrations that don't specify one
    pub default_mailbox_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            inbound_capacity: DEFAULT_INBOUND_CAPACITY,
            default_mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
        }
    }
}

impl RouterConfig {
    /// Set the inbound queue capacity (minimum 1)
    pub fn inbound_capacity(mut self, capacity: usize) -> Self {
        self.inbound_capacity = capacity.max(1);
        self
    }

    /// Set the default mailbox capacity (minimum 1)
    pub fn default_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.default_mailbox_capacity = capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RouterConfig::default();

        assert_eq!(config.inbound_capacity, DEFAULT_INBOUND_CAPACITY);
        assert_eq!(config.default_mailbox_capacity, DEFAULT_MAILBOX_CAPACITY);
    }

    #[test]
    fn test_builder_chaining() {
        let config = RouterConfig::default()
            .inbound_capacity(8)
            .default_mailbox_capacity(2);

        assert_eq!(config.inbound_capacity, 8);
        assert_eq!(config.default_mailbox_capacity, 2);
    }

    #[test]
    fn test_builder_zero_capacity_clamped() {
        // tokio channels reject a zero capacity
        let config = RouterConfig::default()
            .inbound_capacity(0)
            .default_mailbox_capacity(0);

        assert_eq!(config.inbound_capacity, 1);
        assert_eq!(config.default_mailbox_capacity, 1);
    }
}
