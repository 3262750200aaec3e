//! # Store Configuration
//!
//! Tunables for the store layer, chiefly the simulated network latencies.
//! There is no real backend: every "API call" is a timed delay, and the
//! durations here reproduce the original pacing.

use std::time::Duration;

/// Configuration shared by the stores.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Delay applied to login/register/forgot-password.
    pub auth_delay: Duration,

    /// Delay applied to order placement.
    pub checkout_delay: Duration,

    /// Delay applied to wishlist add/remove/toggle.
    pub wishlist_delay: Duration,

    /// How long a notification stays on screen before auto-dismissal.
    pub notification_dismiss: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            auth_delay: Duration::from_millis(800),
            checkout_delay: Duration::from_millis(1500),
            wishlist_delay: Duration::from_millis(300),
            notification_dismiss: Duration::from_secs(3),
        }
    }
}

impl StoreConfig {
    /// Zero-latency configuration for tests.
    pub fn instant() -> Self {
        StoreConfig {
            auth_delay: Duration::ZERO,
            checkout_delay: Duration::ZERO,
            wishlist_delay: Duration::ZERO,
            notification_dismiss: Duration::from_secs(3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_simulated_pacing() {
        let config = StoreConfig::default();
        assert_eq!(config.checkout_delay, Duration::from_millis(1500));
        assert_eq!(config.wishlist_delay, Duration::from_millis(300));
        assert_eq!(config.notification_dismiss, Duration::from_secs(3));
    }

    #[test]
    fn test_instant_zeroes_latencies() {
        let config = StoreConfig::instant();
        assert!(config.auth_delay.is_zero());
        assert!(config.checkout_delay.is_zero());
        assert!(config.wishlist_delay.is_zero());
    }
}
