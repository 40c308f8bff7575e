use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;

/// Host-side access to the native billing SDK.
///
/// This is the only seam a host (plugin runtime, FFI shim, test double) has to
/// implement. Method names and payload shapes are fixed by the platform
/// datasources: Android uses `isReady`, `queryProductDetails`,
/// `launchBillingFlow`, `queryPurchases`, `acknowledgePurchase`,
/// `consumePurchase` and the `purchasesUpdated` event; StoreKit uses
/// `products`, `purchase`, `currentEntitlements`, `allTransactions`,
/// `subscriptionStatus`, `finishTransaction` and the `transactionUpdated`
/// event.
#[async_trait]
pub trait NativeBridge: Send + Sync + 'static {
    /// Calls a native method. `Err` carries the native failure message.
    async fn invoke(
        &self,
        method: &str,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, String>;

    /// Subscribes to a named native event. The receiver yields payloads until
    /// the host tears the subscription down.
    fn listen(&self, event: &str) -> UnboundedReceiver<serde_json::Value>;
}
