#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use super::common::{PaymentMode, ProductTypeModel, SubscriptionPeriodModel};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductsParams {
    pub(crate) product_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductsResponse {
    #[serde(default)]
    pub(crate) products: Vec<ProductModel>,
}

/// https://developer.apple.com/documentation/storekit/product
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductModel {
    pub(crate) id: String,
    pub(crate) display_name: String,
    #[serde(default)]
    pub(crate) description: String,
    /// Localized price with currency symbol.
    pub(crate) display_price: String,
    /// `Decimal` price rendered as a string, e.g. "9.99".
    pub(crate) price: Option<String>,
    /// ISO 4217 code from the product's price format style.
    pub(crate) currency_code: Option<String>,
    #[serde(rename = "type")]
    pub(crate) product_type: ProductTypeModel,
    /// Only set for auto-renewable subscriptions.
    pub(crate) subscription: Option<SubscriptionInfoModel>,
}

/// https://developer.apple.com/documentation/storekit/product/subscriptioninfo
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscriptionInfoModel {
    pub(crate) subscription_group_id: String,
    pub(crate) subscription_period: SubscriptionPeriodModel,
    pub(crate) introductory_offer: Option<SubscriptionOfferModel>,
    #[serde(default)]
    pub(crate) promotional_offers: Vec<SubscriptionOfferModel>,
}

/// https://developer.apple.com/documentation/storekit/product/subscriptionoffer
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscriptionOfferModel {
    /// Absent for introductory offers.
    pub(crate) id: Option<String>,
    pub(crate) display_price: String,
    pub(crate) price: Option<String>,
    pub(crate) payment_mode: PaymentMode,
    pub(crate) period: SubscriptionPeriodModel,
    pub(crate) period_count: i32,
}
