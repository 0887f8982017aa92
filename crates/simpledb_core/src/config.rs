//! Transaction manager configuration.

/// Configuration for a [`TransactionManager`](crate::TransactionManager).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Capacity hint for the committed keyspace maps.
    pub initial_capacity: usize,

    /// Maximum number of concurrently open transactions (0 = unlimited).
    pub max_open_transactions: usize,
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the keyspace capacity hint.
    #[must_use]
    pub const fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets the maximum number of open transactions.
    #[must_use]
    pub const fn max_open_transactions(mut self, limit: usize) -> Self {
        self.max_open_transactions = limit;
        self
    }

    /// Returns the open-transaction limit, if one is configured.
    #[must_use]
    pub(crate) fn transaction_limit(&self) -> Option<usize> {
        (self.max_open_transactions > 0).then_some(self.max_open_transactions)
    }
}
