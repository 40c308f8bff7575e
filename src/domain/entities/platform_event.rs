use super::purchase::Purchase;

/// Result of a native purchase flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// The flow completed; the platform may report more than one purchase
    /// (e.g. a pending renewal arriving on the same callback).
    Purchased(Vec<Purchase>),
    UserCanceled,
    Failed(String),
}

/// Something the platform delivered asynchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    /// Completion of a purchase flow, correlated against the outstanding
    /// request.
    PurchaseFlow(PurchaseOutcome),
    /// Transaction-stream update (renewal, Ask to Buy approval, purchase made
    /// on another device). Never resolves a request.
    TransactionUpdated(Purchase),
}

/// What launching a purchase flow produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The sheet is showing; the result arrives later as a
    /// [`PlatformEvent::PurchaseFlow`].
    AwaitCallback,
    /// The platform returned the flow result directly from the launch call.
    Completed(PurchaseOutcome),
}
