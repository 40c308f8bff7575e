use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::{entitlement::Entitlement, purchase::PurchaseState};

/// Ownership of a single product, derived from current entitlements. When
/// `is_owned` is false every other field is absent.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStatus {
    pub product_id: String,
    pub is_owned: bool,
    pub purchase_state: Option<PurchaseState>,
    pub purchase_time: Option<i64>,
    pub expiration_time: Option<i64>,
    pub is_auto_renewing: Option<bool>,
    pub is_acknowledged: Option<bool>,
    pub purchase_token: Option<String>,
}

impl ProductStatus {
    pub fn not_owned(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            is_owned: false,
            purchase_state: None,
            purchase_time: None,
            expiration_time: None,
            is_auto_renewing: None,
            is_acknowledged: None,
            purchase_token: None,
        }
    }

    /// `product_id` may be any product the entitlement covers, not only the
    /// purchase's primary one.
    pub(crate) fn owned(product_id: impl Into<String>, entitlement: &Entitlement) -> Self {
        let purchase = &entitlement.purchase;
        Self {
            product_id: product_id.into(),
            is_owned: true,
            purchase_state: Some(purchase.purchase_state),
            purchase_time: Some(purchase.purchase_time),
            expiration_time: entitlement.expiration_time,
            is_auto_renewing: Some(purchase.is_auto_renewing),
            is_acknowledged: Some(purchase.is_acknowledged),
            purchase_token: Some(purchase.purchase_token.clone()),
        }
    }
}
