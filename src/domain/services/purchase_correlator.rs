use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Mutex, MutexGuard, PoisonError,
};

use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info};

use crate::{
    domain::entities::{
        platform_event::{PlatformEvent, PurchaseOutcome},
        purchase::Purchase,
    },
    errors::{IapError, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RequestPhase {
    /// Product details are being resolved / the sheet is being launched.
    Requesting,
    /// The sheet is up; waiting for the platform to deliver the result.
    AwaitingResult,
}

struct OutstandingRequest {
    id: u64,
    product_id: String,
    phase: RequestPhase,
    responder: oneshot::Sender<Result<Purchase>>,
}

/// Owns the single outstanding-request slot and the purchase-updated channel.
///
/// The slot lock is never held across an await point, and every path that
/// ends a request (result delivered, launch failed, caller gone, delivery
/// stream closed) empties it.
pub(crate) struct PurchaseCorrelator {
    slot: Mutex<Option<OutstandingRequest>>,
    next_request_id: AtomicU64,
    updates: broadcast::Sender<Purchase>,
    /// Set once nothing will deliver platform events anymore.
    closed: AtomicBool,
}

impl PurchaseCorrelator {
    pub(crate) fn new(update_channel_capacity: usize) -> Self {
        let (updates, _) = broadcast::channel(update_channel_capacity.max(1));
        Self {
            slot: Mutex::new(None),
            next_request_id: AtomicU64::new(1),
            updates,
            closed: AtomicBool::new(false),
        }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Purchase> {
        self.updates.subscribe()
    }

    /// Phase of the outstanding request, `None` when idle.
    #[cfg(test)]
    pub(crate) fn phase(&self) -> Option<RequestPhase> {
        self.slot().as_ref().map(|request| request.phase)
    }

    /// Idle → Requesting. Fails fast if a request is already outstanding or
    /// the correlator was closed.
    pub(crate) fn begin(&self, product_id: &str) -> Result<PurchaseTicket<'_>> {
        let mut slot = self.slot();
        if self.closed.load(Ordering::SeqCst) {
            debug!(requested = product_id, "rejecting purchase after update stream closed");
            return Err(stream_closed());
        }
        if let Some(outstanding) = slot.as_ref() {
            debug!(
                requested = product_id,
                outstanding = %outstanding.product_id,
                phase = ?outstanding.phase,
                "rejecting concurrent purchase"
            );
            return Err(IapError::ConcurrentPurchaseInProgress);
        }
        let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let (responder, receiver) = oneshot::channel();
        *slot = Some(OutstandingRequest {
            id,
            product_id: product_id.to_owned(),
            phase: RequestPhase::Requesting,
            responder,
        });
        Ok(PurchaseTicket {
            correlator: self,
            id,
            receiver,
        })
    }

    /// No further platform deliveries will arrive. Rejects the outstanding
    /// request, if any, and every later `begin`.
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.reject_outstanding(stream_closed());
    }

    /// Routes a platform delivery either to the outstanding request or to the
    /// purchase-updated channel.
    pub(crate) fn deliver(&self, event: PlatformEvent) {
        match event {
            PlatformEvent::TransactionUpdated(purchase) => self.emit(purchase),
            PlatformEvent::PurchaseFlow(PurchaseOutcome::Purchased(purchases)) => {
                self.deliver_purchases(purchases)
            }
            PlatformEvent::PurchaseFlow(PurchaseOutcome::UserCanceled) => {
                self.reject_outstanding(IapError::UserCanceled)
            }
            PlatformEvent::PurchaseFlow(PurchaseOutcome::Failed(detail)) => {
                self.reject_outstanding(IapError::PurchaseFailed(detail))
            }
        }
    }

    fn deliver_purchases(&self, purchases: Vec<Purchase>) {
        if purchases.is_empty() {
            self.reject_outstanding(IapError::PurchaseFailed(
                "purchase flow completed without a purchase".to_string(),
            ));
            return;
        }
        for purchase in purchases {
            let matched = {
                let mut slot = self.slot();
                if slot
                    .as_ref()
                    .is_some_and(|request| request.product_id == purchase.product_id)
                {
                    slot.take()
                } else {
                    None
                }
            };
            match matched {
                Some(request) => Self::resolve(request, Ok(purchase)),
                None => self.emit(purchase),
            }
        }
    }

    fn reject_outstanding(&self, error: IapError) {
        let Some(request) = self.slot().take() else {
            debug!(%error, "purchase flow result with no outstanding request");
            return;
        };
        Self::resolve(request, Err(error));
    }

    fn resolve(request: OutstandingRequest, result: Result<Purchase>) {
        match &result {
            Ok(purchase) => info!(
                product_id = %request.product_id,
                purchase_state = ?purchase.purchase_state,
                "purchase request resolved"
            ),
            Err(error) => debug!(product_id = %request.product_id, %error, "purchase request rejected"),
        }
        if request.responder.send(result).is_err() {
            debug!(product_id = %request.product_id, "purchase requester stopped waiting");
        }
    }

    fn emit(&self, purchase: Purchase) {
        debug!(product_id = %purchase.product_id, "purchase updated");
        if self.updates.send(purchase).is_err() {
            debug!("no purchase update subscribers");
        }
    }

    fn mark_awaiting(&self, id: u64) {
        if let Some(request) = self.slot().as_mut().filter(|request| request.id == id) {
            request.phase = RequestPhase::AwaitingResult;
        }
    }

    /// Delivers a flow result returned directly by the launch call. The
    /// result belongs to request `id`, so if it did not resolve it the request
    /// is rejected rather than left waiting.
    fn complete(&self, id: u64, outcome: PurchaseOutcome) {
        self.deliver(PlatformEvent::PurchaseFlow(outcome));
        let unresolved = {
            let mut slot = self.slot();
            if slot.as_ref().is_some_and(|request| request.id == id) {
                slot.take()
            } else {
                None
            }
        };
        if let Some(request) = unresolved {
            let detail = format!(
                "purchase flow completed without a purchase of {}",
                request.product_id
            );
            Self::resolve(request, Err(IapError::PurchaseFailed(detail)));
        }
    }

    fn release(&self, id: u64) {
        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|request| request.id == id) {
            *slot = None;
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<OutstandingRequest>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn stream_closed() -> IapError {
    IapError::PurchaseFailed("purchase update stream closed".to_string())
}

/// Handle on the outstanding request held by the purchase call. Dropping it
/// releases the slot if the request is still outstanding.
pub(crate) struct PurchaseTicket<'a> {
    correlator: &'a PurchaseCorrelator,
    id: u64,
    receiver: oneshot::Receiver<Result<Purchase>>,
}

impl PurchaseTicket<'_> {
    /// Requesting → AwaitingResult.
    pub(crate) fn launched(&self) {
        self.correlator.mark_awaiting(self.id);
    }

    /// Settles the request with a result the launch call returned itself.
    pub(crate) fn complete(&self, outcome: PurchaseOutcome) {
        self.correlator.complete(self.id, outcome);
    }

    pub(crate) async fn outcome(mut self) -> Result<Purchase> {
        match (&mut self.receiver).await {
            Ok(result) => result,
            Err(_) => Err(IapError::PurchaseFailed(
                "purchase session closed before a result was delivered".to_string(),
            )),
        }
    }
}

impl Drop for PurchaseTicket<'_> {
    fn drop(&mut self) {
        self.correlator.release(self.id);
    }
}
