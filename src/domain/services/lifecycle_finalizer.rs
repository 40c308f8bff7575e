use tracing::debug;

use crate::{
    domain::repositories::iap_repository::IapRepository,
    errors::{IapError, Result},
};

/// Acknowledges a purchase so the platform does not refund it. A no-op on
/// platforms that acknowledge automatically.
pub(crate) async fn acknowledge(repository: &dyn IapRepository, purchase_token: &str) -> Result<()> {
    require_token(purchase_token)?;
    repository.acknowledge(purchase_token).await?;
    debug!("purchase acknowledged");
    Ok(())
}

/// Consumes a one-time purchase so it can be bought again. A no-op on
/// platforms that consume automatically.
pub(crate) async fn consume(repository: &dyn IapRepository, purchase_token: &str) -> Result<()> {
    require_token(purchase_token)?;
    repository.consume(purchase_token).await?;
    debug!("purchase consumed");
    Ok(())
}

fn require_token(purchase_token: &str) -> Result<()> {
    if purchase_token.is_empty() {
        return Err(IapError::InvalidArgument(
            "purchase token is required".to_string(),
        ));
    }
    Ok(())
}
