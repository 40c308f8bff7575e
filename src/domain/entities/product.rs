use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::product_type::ProductType;

/// Snapshot of a store product at query time.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    /// Localized title.
    pub title: String,
    /// Localized description.
    pub description: String,
    pub product_type: ProductType,
    /// Localized price string with currency symbol, e.g. "$9.99".
    pub formatted_price: Option<String>,
    /// ISO 4217 currency code.
    pub price_currency_code: Option<String>,
    /// Price × 1,000,000.
    pub price_amount_micros: Option<i64>,
    /// Offers in the order the platform returned them.
    pub subscription_offer_details: Option<Vec<SubscriptionOffer>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionOffer {
    /// Empty on platforms without offer tokens.
    pub offer_token: String,
    pub base_plan_id: String,
    pub offer_id: Option<String>,
    pub pricing_phases: Vec<PricingPhase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPhase {
    pub formatted_price: String,
    pub price_currency_code: String,
    pub price_amount_micros: i64,
    /// ISO 8601 duration, e.g. "P1M".
    pub billing_period: String,
    pub billing_cycle_count: i32,
    /// 1 = infinite recurring, 2 = finite recurring, 3 = non-recurring.
    pub recurrence_mode: i32,
}

impl PricingPhase {
    pub const INFINITE_RECURRING: i32 = 1;
    pub const FINITE_RECURRING: i32 = 2;
    pub const NON_RECURRING: i32 = 3;
}

impl Product {
    /// First non-empty offer token on the subscription offer list.
    pub fn first_offer_token(&self) -> Option<&str> {
        self.subscription_offer_details
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|offer| offer.offer_token.as_str())
            .find(|token| !token.is_empty())
    }
}
