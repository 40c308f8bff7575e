use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{mpsc::UnboundedReceiver, Mutex};
use tracing::warn;

use crate::{
    bridge::NativeBridge,
    errors::{IapError, Result},
};

/// Calls a native method and decodes its response. Bridge failures and
/// undecodable payloads both surface as `BackendError` naming the method.
pub(crate) async fn invoke_native<B, P, T>(bridge: &B, method: &str, params: &P) -> Result<T>
where
    B: NativeBridge + ?Sized,
    P: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let payload = serde_json::to_value(params)
        .map_err(|e| IapError::native_call(method, format!("failed to encode request: {e}")))?;
    let response = bridge
        .invoke(method, payload)
        .await
        .map_err(|e| IapError::native_call(method, e))?;
    serde_json::from_value(response)
        .map_err(|e| IapError::native_call(method, format!("failed to parse response: {e}")))
}

/// A native event subscription, decoded into `T`. Payloads that fail to decode
/// are logged and skipped.
pub(crate) struct NativeEventStream<T> {
    event: &'static str,
    receiver: Mutex<UnboundedReceiver<serde_json::Value>>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> NativeEventStream<T> {
    pub(crate) fn subscribe<B: NativeBridge + ?Sized>(bridge: &B, event: &'static str) -> Self {
        Self {
            event,
            receiver: Mutex::new(bridge.listen(event)),
            _marker: std::marker::PhantomData,
        }
    }

    /// `None` once the host closed the subscription.
    pub(crate) async fn next(&self) -> Option<T> {
        let mut receiver = self.receiver.lock().await;
        loop {
            let payload = receiver.recv().await?;
            match serde_json::from_value(payload) {
                Ok(decoded) => return Some(decoded),
                Err(e) => warn!(event = self.event, error = %e, "skipping undecodable native event"),
            }
        }
    }
}
