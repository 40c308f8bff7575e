use serde::Deserialize;

/// https://developer.apple.com/documentation/storekit/product/producttype
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum ProductTypeModel {
    /// A consumable in-app purchase.
    Consumable,
    /// A non-consumable in-app purchase.
    NonConsumable,
    /// An auto-renewable subscription.
    AutoRenewable,
    /// A non-renewing subscription.
    NonRenewable,

    #[serde(untagged)]
    Unknown(String),
}

/// https://developer.apple.com/documentation/storekit/product/subscriptionoffer/paymentmode
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum PaymentMode {
    /// A payment mode of a product discount that indicates a free trial.
    FreeTrial,
    /// A payment mode of a product discount that customers pay over a single or
    /// multiple billing periods.
    PayAsYouGo,
    /// A payment mode of a product discount that customers pay up front.
    PayUpFront,

    #[serde(untagged)]
    Unknown(String),
}

/// https://developer.apple.com/documentation/storekit/product/subscriptionperiod
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscriptionPeriodModel {
    pub(crate) unit: PeriodUnit,
    pub(crate) value: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum PeriodUnit {
    Day,
    Week,
    Month,
    Year,
}

impl SubscriptionPeriodModel {
    /// ISO 8601 duration, e.g. "P1M".
    pub(crate) fn iso8601(&self) -> String {
        let designator = match self.unit {
            PeriodUnit::Day => 'D',
            PeriodUnit::Week => 'W',
            PeriodUnit::Month => 'M',
            PeriodUnit::Year => 'Y',
        };
        format!("P{}{designator}", self.value)
    }
}
