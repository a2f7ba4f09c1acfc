//! Session configuration

use std::time::Duration;

use rfcollector_core::constants::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_TRANSACTION_TIMEOUT, IMPINJ_VENDOR_ID,
};

/// Timing and identity settings for a [`Session`](crate::Session)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    transaction_timeout: Duration,
    connect_timeout: Duration,
    vendor_id: u32,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self {
            transaction_timeout: Duration::from_secs(DEFAULT_TRANSACTION_TIMEOUT),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT),
            vendor_id: IMPINJ_VENDOR_ID,
        }
    }

    /// Deadline for each request/response transaction
    ///
    /// Also bounds the wait for the reader's connection confirmation.
    pub fn with_transaction_timeout(mut self, timeout: Duration) -> Self {
        self.transaction_timeout = timeout;
        self
    }

    /// Deadline for establishing the connection
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Vendor the reader must report in its capabilities
    pub fn with_vendor_id(mut self, vendor_id: u32) -> Self {
        self.vendor_id = vendor_id;
        self
    }

    pub fn transaction_timeout(&self) -> Duration {
        self.transaction_timeout
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn vendor_id(&self) -> u32 {
        self.vendor_id
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.transaction_timeout(), Duration::from_secs(10));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.vendor_id(), 25882);
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::new()
            .with_transaction_timeout(Duration::from_millis(250))
            .with_vendor_id(1);
        assert_eq!(config.transaction_timeout(), Duration::from_millis(250));
        assert_eq!(config.vendor_id(), 1);
    }
}
