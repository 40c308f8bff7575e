use super::{product_type::ProductType, purchase::Purchase};

/// A normalized purchase from a platform's current-entitlements listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entitlement {
    pub purchase: Purchase,
    pub product_type: ProductType,
    /// Subscription expiry, or the revocation time of a revoked transaction.
    /// Epoch milliseconds; absent where the platform does not report it.
    pub expiration_time: Option<i64>,
    /// Every product the purchase grants. Multi-line Android purchases list
    /// more than `purchase.product_id`.
    pub product_ids: Vec<String>,
}

impl Entitlement {
    pub fn covers(&self, product_id: &str) -> bool {
        self.purchase.product_id == product_id || self.product_ids.iter().any(|id| id == product_id)
    }
}
