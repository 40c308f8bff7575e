use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use uuid::Uuid;

use crate::errors::{IapError, Result};

use super::product::Product;

/// Optional hints for a purchase request. Fields a platform does not use are
/// ignored there.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOptions {
    /// Subscription offer to purchase (Android). Used verbatim when supplied.
    pub offer_token: Option<String>,
    /// Obfuscated user account id (Android).
    pub obfuscated_account_id: Option<String>,
    /// Obfuscated user profile id (Android).
    pub obfuscated_profile_id: Option<String>,
    /// Hyphenated UUID associating the transaction with a user account
    /// (StoreKit).
    pub app_account_token: Option<String>,
}

impl PurchaseOptions {
    pub fn with_offer_token(mut self, offer_token: impl Into<String>) -> Self {
        self.offer_token = Some(offer_token.into());
        self
    }

    pub fn with_app_account_token(mut self, app_account_token: impl Into<String>) -> Self {
        self.app_account_token = Some(app_account_token.into());
        self
    }

    /// Parses `app_account_token`. Only the canonical hyphenated form is
    /// accepted, matching what StoreKit accepts.
    pub fn app_account_token(&self) -> Result<Option<Uuid>> {
        let Some(raw) = self.app_account_token.as_deref() else {
            return Ok(None);
        };
        let invalid = || {
            IapError::InvalidArgument(format!(
                "appAccountToken must be a valid UUID string, got {raw:?}"
            ))
        };
        let uuid = Uuid::parse_str(raw).map_err(|_| invalid())?;
        if !uuid.hyphenated().to_string().eq_ignore_ascii_case(raw) {
            return Err(invalid());
        }
        Ok(Some(uuid))
    }
}

/// Everything a platform needs to present its purchase sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub product: Product,
    pub offer_token: Option<String>,
    pub obfuscated_account_id: Option<String>,
    pub obfuscated_profile_id: Option<String>,
    pub app_account_token: Option<Uuid>,
}

impl LaunchRequest {
    /// Applies the offer-token policy: the explicit token if given, else the
    /// product's first offer token, else none (base plan).
    pub(crate) fn resolve(
        product: Product,
        options: PurchaseOptions,
        app_account_token: Option<Uuid>,
    ) -> Self {
        let offer_token = options
            .offer_token
            .or_else(|| product.first_offer_token().map(str::to_owned));
        Self {
            product,
            offer_token,
            obfuscated_account_id: options.obfuscated_account_id,
            obfuscated_profile_id: options.obfuscated_profile_id,
            app_account_token,
        }
    }
}
