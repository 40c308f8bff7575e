use tracing::debug;

use crate::{
    domain::{
        entities::{
            product_status::ProductStatus,
            product_type::ProductType,
            purchase::{Purchase, PurchaseState},
        },
        repositories::iap_repository::IapRepository,
    },
    errors::Result,
};

/// Current entitlements of `product_type`, normalized.
pub(crate) async fn list_current_entitlements(
    repository: &dyn IapRepository,
    product_type: ProductType,
) -> Result<Vec<Purchase>> {
    Ok(repository
        .current_entitlements(product_type)
        .await?
        .into_iter()
        .filter(|entitlement| entitlement.product_type == product_type)
        .map(|entitlement| entitlement.purchase)
        .collect())
}

/// Ownership of `product_id`. Not owning a product is a regular answer, not
/// an error. Canceled matches (revoked or expired transactions) do not count.
pub(crate) async fn status_of(
    repository: &dyn IapRepository,
    product_id: &str,
    product_type: ProductType,
) -> Result<ProductStatus> {
    let entitlements = repository.current_entitlements(product_type).await?;
    let owned = entitlements.iter().find(|entitlement| {
        entitlement.product_type == product_type
            && entitlement.covers(product_id)
            && entitlement.purchase.purchase_state != PurchaseState::Canceled
    });
    Ok(match owned {
        Some(entitlement) => ProductStatus::owned(product_id, entitlement),
        None => {
            debug!(product_id, %product_type, "no current entitlement");
            ProductStatus::not_owned(product_id)
        }
    })
}
