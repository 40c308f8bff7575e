use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use serde_with::skip_serializing_none;

/// Canonical purchase state. Serialized as its integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum PurchaseState {
    /// The entitlement is currently valid.
    Purchased = 0,
    /// Canceled, revoked, or expired.
    Canceled = 1,
    /// Awaiting payment. Only emitted by platforms that distinguish it.
    Pending = 2,
}

/// Canonical purchase record, identical in shape on every platform.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub order_id: Option<String>,
    /// Android package name or Apple bundle identifier.
    pub package_name: String,
    pub product_id: String,
    /// Epoch milliseconds.
    pub purchase_time: i64,
    /// Identifies this transaction instance for acknowledgment and server-side
    /// verification. A renewal may carry a new token.
    pub purchase_token: String,
    pub purchase_state: PurchaseState,
    /// Always false for one-time products.
    pub is_auto_renewing: bool,
    /// Unacknowledged Android purchases are refunded after 3 days. Always true
    /// on platforms that acknowledge automatically.
    pub is_acknowledged: bool,
    /// Raw purchase payload (Android only).
    pub original_json: Option<String>,
    /// Signature over `original_json` (Android only).
    pub signature: Option<String>,
    /// Original transaction id, linking renewals and restores to the first
    /// purchase (StoreKit only).
    pub original_id: Option<String>,
    /// Signed transaction for server-side validation (StoreKit only).
    pub jws_representation: Option<String>,
}

/// A past transaction, as returned by purchase history queries.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseHistoryRecord {
    pub product_id: String,
    pub purchase_time: i64,
    pub purchase_token: String,
    pub quantity: u32,
    pub original_json: Option<String>,
    pub signature: Option<String>,
}
