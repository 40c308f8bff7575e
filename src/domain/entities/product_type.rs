use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Public product type vocabulary: `"subs"` or `"inapp"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProductType {
    /// Auto-renewable or non-renewing subscription.
    #[default]
    Subscription,
    /// One-time product (consumable or non-consumable).
    InApp,
}

impl ProductType {
    pub const SUBS: &'static str = "subs";
    pub const INAPP: &'static str = "inapp";

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Subscription => Self::SUBS,
            ProductType::InApp => Self::INAPP,
        }
    }

    /// Parses the public vocabulary. Anything other than `"inapp"` is treated
    /// as a subscription.
    pub fn from_public(value: &str) -> Self {
        match value {
            Self::INAPP => ProductType::InApp,
            Self::SUBS => ProductType::Subscription,
            other => {
                tracing::debug!(product_type = other, "unknown product type, using \"subs\"");
                ProductType::Subscription
            }
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ProductType {
    fn from(value: &str) -> Self {
        Self::from_public(value)
    }
}

impl Serialize for ProductType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProductType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_public(&value))
    }
}
