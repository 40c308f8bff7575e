use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_repr::Deserialize_repr;

use super::{billing_result_model::BillingResultModel, product_details_model::NativeProductType};

/// https://developer.android.com/reference/com/android/billingclient/api/Purchase
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PurchaseModel {
    /// Empty for pending purchases and test purchases on some Play versions.
    pub(crate) order_id: Option<String>,
    pub(crate) package_name: String,
    /// Product ids in this purchase. Multi-line purchases carry more than one.
    pub(crate) products: Vec<String>,
    #[serde(with = "ts_milliseconds")]
    pub(crate) purchase_time: DateTime<Utc>,
    pub(crate) purchase_token: String,
    pub(crate) purchase_state: PurchaseStateModel,
    #[serde(default)]
    pub(crate) is_auto_renewing: bool,
    #[serde(default)]
    pub(crate) is_acknowledged: bool,
    /// JSON payload signed by Play.
    pub(crate) original_json: Option<String>,
    pub(crate) signature: Option<String>,
}

/// https://developer.android.com/reference/com/android/billingclient/api/Purchase.PurchaseState
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize_repr)]
#[repr(u8)]
pub(crate) enum PurchaseStateModel {
    UnspecifiedState = 0,
    Purchased = 1,
    Pending = 2,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryPurchasesParams {
    pub(crate) product_type: NativeProductType,
}

/// Response of `queryPurchases`. Purchases stay raw and are decoded one by
/// one, so a single malformed record does not hide the others.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PurchasesResponse {
    pub(crate) billing_result: BillingResultModel,
    #[serde(default)]
    pub(crate) purchases: Vec<Value>,
}

/// Payload of the `purchasesUpdated` event (PurchasesUpdatedListener).
///
/// Nothing here is decoded eagerly: an unrecognised response code or purchase
/// record must still reach the outstanding request as a result.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PurchasesUpdatedModel {
    #[serde(default)]
    pub(crate) billing_result: Value,
    pub(crate) purchases: Option<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PurchaseTokenParams {
    pub(crate) purchase_token: String,
}
