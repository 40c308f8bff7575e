use serde::{Deserialize, Serialize};
use serde_repr::Deserialize_repr;
use serde_with::skip_serializing_none;

use super::billing_result_model::BillingResultModel;

/// Native product type vocabulary of the Play Billing Library.
///
/// https://developer.android.com/reference/com/android/billingclient/api/BillingClient.ProductType
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum NativeProductType {
    #[serde(rename = "subs")]
    Subs,
    #[serde(rename = "inapp")]
    InApp,

    #[serde(untagged)]
    Unknown(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryProductDetailsParams {
    pub(crate) product_list: Vec<QueryProductModel>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryProductModel {
    pub(crate) product_id: String,
    pub(crate) product_type: NativeProductType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductDetailsResponse {
    pub(crate) billing_result: BillingResultModel,
    #[serde(default)]
    pub(crate) product_details_list: Vec<ProductDetailsModel>,
}

/// https://developer.android.com/reference/com/android/billingclient/api/ProductDetails
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductDetailsModel {
    pub(crate) product_id: String,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    pub(crate) product_type: NativeProductType,
    /// Only set for one-time products.
    pub(crate) one_time_purchase_offer_details: Option<OneTimePurchaseOfferDetailsModel>,
    /// Only set for subscriptions. Ordered as returned by Play.
    pub(crate) subscription_offer_details: Option<Vec<SubscriptionOfferDetailsModel>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OneTimePurchaseOfferDetailsModel {
    pub(crate) formatted_price: String,
    pub(crate) price_amount_micros: i64,
    pub(crate) price_currency_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscriptionOfferDetailsModel {
    pub(crate) base_plan_id: String,
    /// Absent for the base plan itself.
    pub(crate) offer_id: Option<String>,
    pub(crate) offer_token: String,
    pub(crate) pricing_phases: PricingPhasesModel,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PricingPhasesModel {
    pub(crate) pricing_phase_list: Vec<PricingPhaseModel>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PricingPhaseModel {
    pub(crate) formatted_price: String,
    pub(crate) price_amount_micros: i64,
    pub(crate) price_currency_code: String,
    /// ISO 8601 duration.
    pub(crate) billing_period: String,
    pub(crate) billing_cycle_count: i32,
    pub(crate) recurrence_mode: RecurrenceMode,
}

/// https://developer.android.com/reference/com/android/billingclient/api/ProductDetails.RecurrenceMode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize_repr)]
#[repr(u8)]
pub(crate) enum RecurrenceMode {
    InfiniteRecurring = 1,
    FiniteRecurring = 2,
    NonRecurring = 3,
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BillingFlowParams {
    pub(crate) product_id: String,
    pub(crate) product_type: NativeProductType,
    pub(crate) offer_token: Option<String>,
    pub(crate) obfuscated_account_id: Option<String>,
    pub(crate) obfuscated_profile_id: Option<String>,
}
