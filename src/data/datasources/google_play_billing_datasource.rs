use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    bridge::NativeBridge,
    data::models::google_play_billing::{
        billing_result_model::BillingResultModel,
        product_details_model::{
            BillingFlowParams, NativeProductType, ProductDetailsResponse,
            QueryProductDetailsParams,
        },
        purchase_model::{
            PurchaseTokenParams, PurchasesResponse, PurchasesUpdatedModel, QueryPurchasesParams,
        },
    },
    errors::Result,
};

use super::utils::{invoke_native, NativeEventStream};

const IS_READY: &str = "isReady";
const QUERY_PRODUCT_DETAILS: &str = "queryProductDetails";
const LAUNCH_BILLING_FLOW: &str = "launchBillingFlow";
const QUERY_PURCHASES: &str = "queryPurchases";
const ACKNOWLEDGE_PURCHASE: &str = "acknowledgePurchase";
const CONSUME_PURCHASE: &str = "consumePurchase";
const PURCHASES_UPDATED: &str = "purchasesUpdated";

/// Play Billing Library calls, as exposed by the host's `BillingClient`
/// wrapper.
#[async_trait]
pub(crate) trait GooglePlayBillingDatasource: Send + Sync {
    /// BillingClient.isReady:
    /// https://developer.android.com/reference/com/android/billingclient/api/BillingClient#isReady()
    async fn is_ready(&self) -> Result<bool>;

    /// BillingClient.queryProductDetailsAsync:
    /// https://developer.android.com/reference/com/android/billingclient/api/BillingClient#queryProductDetailsAsync(com.android.billingclient.api.QueryProductDetailsParams,com.android.billingclient.api.ProductDetailsResponseListener)
    async fn query_product_details(
        &self,
        params: QueryProductDetailsParams,
    ) -> Result<ProductDetailsResponse>;

    /// BillingClient.launchBillingFlow. Only reports whether the sheet was
    /// shown; the purchase result arrives on `purchasesUpdated`.
    async fn launch_billing_flow(&self, params: BillingFlowParams) -> Result<BillingResultModel>;

    /// BillingClient.queryPurchasesAsync. Returns active (non-consumed,
    /// non-expired) purchases only.
    async fn query_purchases(&self, product_type: NativeProductType) -> Result<PurchasesResponse>;

    async fn acknowledge_purchase(&self, purchase_token: &str) -> Result<BillingResultModel>;

    async fn consume_purchase(&self, purchase_token: &str) -> Result<BillingResultModel>;

    /// Next PurchasesUpdatedListener callback. `None` once the host closed the
    /// subscription.
    async fn next_purchases_update(&self) -> Option<PurchasesUpdatedModel>;
}

pub(crate) struct GooglePlayBillingDatasourceImpl {
    bridge: Arc<dyn NativeBridge>,
    purchases_updated: NativeEventStream<PurchasesUpdatedModel>,
}

#[async_trait]
impl GooglePlayBillingDatasource for GooglePlayBillingDatasourceImpl {
    async fn is_ready(&self) -> Result<bool> {
        invoke_native(self.bridge.as_ref(), IS_READY, &()).await
    }

    async fn query_product_details(
        &self,
        params: QueryProductDetailsParams,
    ) -> Result<ProductDetailsResponse> {
        invoke_native(self.bridge.as_ref(), QUERY_PRODUCT_DETAILS, &params).await
    }

    async fn launch_billing_flow(&self, params: BillingFlowParams) -> Result<BillingResultModel> {
        invoke_native(self.bridge.as_ref(), LAUNCH_BILLING_FLOW, &params).await
    }

    async fn query_purchases(&self, product_type: NativeProductType) -> Result<PurchasesResponse> {
        let params = QueryPurchasesParams { product_type };
        invoke_native(self.bridge.as_ref(), QUERY_PURCHASES, &params).await
    }

    async fn acknowledge_purchase(&self, purchase_token: &str) -> Result<BillingResultModel> {
        let params = PurchaseTokenParams {
            purchase_token: purchase_token.to_string(),
        };
        invoke_native(self.bridge.as_ref(), ACKNOWLEDGE_PURCHASE, &params).await
    }

    async fn consume_purchase(&self, purchase_token: &str) -> Result<BillingResultModel> {
        let params = PurchaseTokenParams {
            purchase_token: purchase_token.to_string(),
        };
        invoke_native(self.bridge.as_ref(), CONSUME_PURCHASE, &params).await
    }

    async fn next_purchases_update(&self) -> Option<PurchasesUpdatedModel> {
        self.purchases_updated.next().await
    }
}

impl GooglePlayBillingDatasourceImpl {
    /// Subscribes to `purchasesUpdated` immediately so no callback delivered
    /// after construction is missed.
    pub(crate) fn new(bridge: Arc<dyn NativeBridge>) -> Self {
        let purchases_updated = NativeEventStream::subscribe(bridge.as_ref(), PURCHASES_UPDATED);
        Self {
            bridge,
            purchases_updated,
        }
    }
}
