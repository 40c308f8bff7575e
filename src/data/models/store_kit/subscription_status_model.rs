#![allow(dead_code)]

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscriptionStatusParams {
    pub(crate) product_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscriptionStatusResponse {
    #[serde(default)]
    pub(crate) statuses: Vec<SubscriptionStatusModel>,
}

/// https://developer.apple.com/documentation/storekit/product/subscriptioninfo/status
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscriptionStatusModel {
    pub(crate) state: RenewalState,
    /// Only the verified renewal info is forwarded by the host.
    pub(crate) renewal_info: Option<RenewalInfoModel>,
}

/// https://developer.apple.com/documentation/storekit/product/subscriptioninfo/renewalstate
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum RenewalState {
    Subscribed,
    Expired,
    InBillingRetryPeriod,
    InGracePeriod,
    Revoked,

    #[serde(untagged)]
    Unknown(String),
}

/// https://developer.apple.com/documentation/storekit/product/subscriptioninfo/renewalinfo
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RenewalInfoModel {
    pub(crate) will_auto_renew: bool,
    pub(crate) auto_renew_preference: Option<String>,
}
