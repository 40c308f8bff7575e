use async_trait::async_trait;

use crate::{
    domain::entities::{
        entitlement::Entitlement,
        platform_event::{LaunchOutcome, PlatformEvent},
        product::Product,
        product_type::ProductType,
        purchase::PurchaseHistoryRecord,
        purchase_options::LaunchRequest,
    },
    errors::Result,
};

/// One billing platform, speaking the canonical model.
///
/// Implementations normalize every native object before returning it. The
/// engine owns request correlation; implementations hold no purchase state.
#[async_trait]
pub trait IapRepository: Send + Sync + 'static {
    /// Whether the billing connection is established.
    async fn is_ready(&self) -> bool;

    /// Product details for the given ids, restricted to `product_type`.
    /// Unknown ids are absent from the result.
    async fn query_products(
        &self,
        product_ids: &[String],
        product_type: ProductType,
    ) -> Result<Vec<Product>>;

    /// Presents the native purchase sheet.
    async fn launch_purchase(&self, request: LaunchRequest) -> Result<LaunchOutcome>;

    /// Current (platform-defined) entitlements of the given type.
    async fn current_entitlements(&self, product_type: ProductType) -> Result<Vec<Entitlement>>;

    /// Every past transaction, or `Unsupported` where the platform cannot
    /// enumerate them.
    async fn purchase_history(&self) -> Result<Vec<PurchaseHistoryRecord>>;

    async fn acknowledge(&self, purchase_token: &str) -> Result<()>;

    async fn consume(&self, purchase_token: &str) -> Result<()>;

    /// Waits for the next asynchronous delivery. `None` once the platform
    /// stream has closed.
    async fn next_event(&self) -> Option<PlatformEvent>;
}
