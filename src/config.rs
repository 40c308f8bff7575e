use serde::Deserialize;

use crate::errors::{IapError, Result};

const ENV_PREFIX: &str = "IAP";

fn default_update_channel_capacity() -> usize {
    64
}

/// Engine configuration.
///
/// Environment variables (see [`IapConfig::from_env`]):
///   IAP_APPLICATION_ID           package name / bundle identifier
///   IAP_UPDATE_CHANNEL_CAPACITY  buffered purchase-updated events per
///                                subscriber (default 64)
#[derive(Debug, Clone, Deserialize)]
pub struct IapConfig {
    /// Reported as `Purchase::package_name` on platforms whose transactions do
    /// not carry it (StoreKit).
    pub application_id: String,
    #[serde(default = "default_update_channel_capacity")]
    pub update_channel_capacity: usize,
}

impl IapConfig {
    pub fn new(application_id: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            update_channel_capacity: default_update_channel_capacity(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| IapError::InvalidArgument(format!("invalid IAP configuration: {e}")))?;
        config.validated()
    }

    pub(crate) fn validated(self) -> Result<Self> {
        if self.application_id.is_empty() {
            return Err(IapError::InvalidArgument(
                "application_id must not be empty".to_string(),
            ));
        }
        if self.update_channel_capacity == 0 {
            return Err(IapError::InvalidArgument(
                "update_channel_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(self)
    }
}
