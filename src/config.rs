//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Onboarding manager configuration.
#[derive(Debug, Clone)]
pub struct OnboardingConfig {
    /// Delay before the wizard auto-presents itself to an unfinished user.
    pub auto_open_delay: Duration,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            auto_open_delay: Duration::from_millis(3000),
        }
    }
}

impl OnboardingConfig {
    /// Build a config from `BIZDASH_*` environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var("BIZDASH_AUTO_OPEN_MS") {
            let ms: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "BIZDASH_AUTO_OPEN_MS".to_string(),
                message: format!("expected milliseconds, got {raw:?}"),
            })?;
            config.auto_open_delay = Duration::from_millis(ms);
        }
        Ok(config)
    }
}
