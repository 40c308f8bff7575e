use std::sync::Arc;

use async_trait::async_trait;
use serde::de::IgnoredAny;

use crate::{
    bridge::NativeBridge,
    data::models::store_kit::{
        product_model::{ProductModel, ProductsParams, ProductsResponse},
        purchase_result_model::{PurchaseParams, PurchaseResultModel},
        subscription_status_model::{
            SubscriptionStatusModel, SubscriptionStatusParams, SubscriptionStatusResponse,
        },
        transaction_model::{FinishTransactionParams, TransactionsResponse, VerificationResultModel},
    },
    errors::Result,
};

use super::utils::{invoke_native, NativeEventStream};

const PRODUCTS: &str = "products";
const PURCHASE: &str = "purchase";
const CURRENT_ENTITLEMENTS: &str = "currentEntitlements";
const ALL_TRANSACTIONS: &str = "allTransactions";
const SUBSCRIPTION_STATUS: &str = "subscriptionStatus";
const FINISH_TRANSACTION: &str = "finishTransaction";
const TRANSACTION_UPDATED: &str = "transactionUpdated";

/// StoreKit 2 calls, as exposed by the host (iOS / macOS).
#[async_trait]
pub(crate) trait StoreKitDatasource: Send + Sync {
    /// Product.products(for:):
    /// https://developer.apple.com/documentation/storekit/product/products(for:)
    async fn products(&self, product_ids: &[String]) -> Result<Vec<ProductModel>>;

    /// Product.purchase(options:). Resolves once the sheet is dismissed.
    async fn purchase(&self, params: PurchaseParams) -> Result<PurchaseResultModel>;

    /// Transaction.currentEntitlements:
    /// https://developer.apple.com/documentation/storekit/transaction/currententitlements
    async fn current_entitlements(&self) -> Result<Vec<VerificationResultModel>>;

    /// Transaction.all, including expired and finished transactions.
    async fn all_transactions(&self) -> Result<Vec<VerificationResultModel>>;

    /// Product.SubscriptionInfo.status for the product's subscription group.
    async fn subscription_status(&self, product_id: &str) -> Result<Vec<SubscriptionStatusModel>>;

    /// Transaction.finish(). StoreKit keeps redelivering unfinished
    /// transactions on `Transaction.updates`.
    async fn finish_transaction(&self, transaction_id: u64) -> Result<()>;

    /// Next element of `Transaction.updates`. `None` once the host closed the
    /// subscription.
    async fn next_transaction_update(&self) -> Option<VerificationResultModel>;
}

pub(crate) struct StoreKitDatasourceImpl {
    bridge: Arc<dyn NativeBridge>,
    transaction_updates: NativeEventStream<VerificationResultModel>,
}

#[async_trait]
impl StoreKitDatasource for StoreKitDatasourceImpl {
    async fn products(&self, product_ids: &[String]) -> Result<Vec<ProductModel>> {
        let params = ProductsParams {
            product_ids: product_ids.to_vec(),
        };
        let response: ProductsResponse =
            invoke_native(self.bridge.as_ref(), PRODUCTS, &params).await?;
        Ok(response.products)
    }

    async fn purchase(&self, params: PurchaseParams) -> Result<PurchaseResultModel> {
        invoke_native(self.bridge.as_ref(), PURCHASE, &params).await
    }

    async fn current_entitlements(&self) -> Result<Vec<VerificationResultModel>> {
        let response: TransactionsResponse =
            invoke_native(self.bridge.as_ref(), CURRENT_ENTITLEMENTS, &()).await?;
        Ok(response.transactions)
    }

    async fn all_transactions(&self) -> Result<Vec<VerificationResultModel>> {
        let response: TransactionsResponse =
            invoke_native(self.bridge.as_ref(), ALL_TRANSACTIONS, &()).await?;
        Ok(response.transactions)
    }

    async fn subscription_status(&self, product_id: &str) -> Result<Vec<SubscriptionStatusModel>> {
        let params = SubscriptionStatusParams {
            product_id: product_id.to_string(),
        };
        let response: SubscriptionStatusResponse =
            invoke_native(self.bridge.as_ref(), SUBSCRIPTION_STATUS, &params).await?;
        Ok(response.statuses)
    }

    async fn finish_transaction(&self, transaction_id: u64) -> Result<()> {
        let params = FinishTransactionParams { transaction_id };
        let _: IgnoredAny = invoke_native(self.bridge.as_ref(), FINISH_TRANSACTION, &params).await?;
        Ok(())
    }

    async fn next_transaction_update(&self) -> Option<VerificationResultModel> {
        self.transaction_updates.next().await
    }
}

impl StoreKitDatasourceImpl {
    pub(crate) fn new(bridge: Arc<dyn NativeBridge>) -> Self {
        let transaction_updates =
            NativeEventStream::subscribe(bridge.as_ref(), TRANSACTION_UPDATED);
        Self {
            bridge,
            transaction_updates,
        }
    }
}
