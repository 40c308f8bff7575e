#![allow(dead_code)]

use chrono::serde::{ts_milliseconds, ts_milliseconds_option};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::ProductTypeModel;

fn default_quantity() -> u32 {
    1
}

/// https://developer.apple.com/documentation/storekit/transaction
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TransactionModel {
    pub(crate) id: u64,
    /// Identifier of the first transaction in a renewal / restore chain.
    pub(crate) original_id: u64,
    pub(crate) product_id: String,
    pub(crate) product_type: ProductTypeModel,
    #[serde(with = "ts_milliseconds")]
    pub(crate) purchase_date: DateTime<Utc>,
    /// Subscription expiry; absent for non-subscription products.
    #[serde(default, with = "ts_milliseconds_option")]
    pub(crate) expiration_date: Option<DateTime<Utc>>,
    /// Set when Apple refunded the transaction or revoked Family Sharing.
    #[serde(default, with = "ts_milliseconds_option")]
    pub(crate) revocation_date: Option<DateTime<Utc>>,
    #[serde(default = "default_quantity")]
    pub(crate) purchased_quantity: u32,
    pub(crate) app_account_token: Option<String>,
}

/// https://developer.apple.com/documentation/storekit/verificationresult
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub(crate) enum VerificationResultModel {
    Verified {
        transaction: TransactionModel,
        jws_representation: String,
    },
    Unverified {
        transaction: TransactionModel,
        #[serde(default)]
        verification_error: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TransactionsResponse {
    #[serde(default)]
    pub(crate) transactions: Vec<VerificationResultModel>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FinishTransactionParams {
    pub(crate) transaction_id: u64,
}
