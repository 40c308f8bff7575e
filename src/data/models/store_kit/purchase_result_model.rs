use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use uuid::Uuid;

use super::transaction_model::VerificationResultModel;

#[skip_serializing_none]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PurchaseParams {
    pub(crate) product_id: String,
    pub(crate) app_account_token: Option<Uuid>,
}

/// https://developer.apple.com/documentation/storekit/product/purchaseresult
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub(crate) enum PurchaseResultModel {
    Success { verification: VerificationResultModel },
    UserCancelled,
    /// Awaiting approval (Ask to Buy) or deferred by the store. The eventual
    /// transaction arrives on `Transaction.updates`.
    Pending,
}
