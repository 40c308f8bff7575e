use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    bridge::NativeBridge,
    data::{
        datasources::google_play_billing_datasource::{
            GooglePlayBillingDatasource, GooglePlayBillingDatasourceImpl,
        },
        models::google_play_billing::{
            billing_result_model::{BillingResponseCode, BillingResultModel},
            product_details_model::{
                self as gd, BillingFlowParams, NativeProductType, QueryProductDetailsParams,
                QueryProductModel,
            },
            purchase_model::{PurchaseModel, PurchasesUpdatedModel},
        },
    },
    domain::{
        entities::{
            entitlement::Entitlement,
            platform_event::{LaunchOutcome, PlatformEvent, PurchaseOutcome},
            product::{PricingPhase, Product, SubscriptionOffer},
            product_type::ProductType,
            purchase::{Purchase, PurchaseHistoryRecord},
            purchase_options::LaunchRequest,
        },
        repositories::iap_repository::IapRepository,
    },
    errors::{IapError, Result},
};

/// Android Play Billing Library backend.
pub(crate) struct GooglePlayIapRepositoryImpl<D: GooglePlayBillingDatasource> {
    datasource: D,
}

#[async_trait]
impl<D: GooglePlayBillingDatasource + 'static> IapRepository for GooglePlayIapRepositoryImpl<D> {
    async fn is_ready(&self) -> bool {
        match self.datasource.is_ready().await {
            Ok(ready) => ready,
            Err(e) => {
                debug!(error = %e, "billing readiness check failed");
                false
            }
        }
    }

    async fn query_products(
        &self,
        product_ids: &[String],
        product_type: ProductType,
    ) -> Result<Vec<Product>> {
        if product_ids.is_empty() {
            return Ok(vec![]);
        }
        self.ensure_ready().await?;
        let params = QueryProductDetailsParams {
            product_list: product_ids
                .iter()
                .map(|product_id| QueryProductModel {
                    product_id: product_id.clone(),
                    product_type: product_type.into(),
                })
                .collect(),
        };
        let response = self.datasource.query_product_details(params).await?;
        check(&response.billing_result, "Failed to fetch products")?;
        Ok(response
            .product_details_list
            .into_iter()
            .map(Product::from_google_play_product_details)
            .collect())
    }

    async fn launch_purchase(&self, request: LaunchRequest) -> Result<LaunchOutcome> {
        self.ensure_ready().await?;
        debug!(
            product_id = %request.product.product_id,
            offer_token = ?request.offer_token,
            "launching billing flow"
        );
        let params = BillingFlowParams {
            product_id: request.product.product_id,
            product_type: request.product.product_type.into(),
            offer_token: request.offer_token,
            obfuscated_account_id: request.obfuscated_account_id,
            obfuscated_profile_id: request.obfuscated_profile_id,
        };
        let result = self.datasource.launch_billing_flow(params).await?;
        check(&result, "Failed to launch billing flow")?;
        Ok(LaunchOutcome::AwaitCallback)
    }

    async fn current_entitlements(&self, product_type: ProductType) -> Result<Vec<Entitlement>> {
        self.ensure_ready().await?;
        let response = self.datasource.query_purchases(product_type.into()).await?;
        check(&response.billing_result, "Failed to restore purchases")?;
        Ok(response
            .purchases
            .iter()
            .filter_map(|record| match Entitlement::from_google_play_record(record, product_type) {
                Ok(entitlement) => Some(entitlement),
                Err(e) => {
                    warn!(error = %e, "skipping purchase that could not be normalized");
                    None
                }
            })
            .collect())
    }

    async fn purchase_history(&self) -> Result<Vec<PurchaseHistoryRecord>> {
        // queryPurchaseHistoryAsync was removed in Play Billing Library 8.
        Err(IapError::Unsupported("purchase history"))
    }

    async fn acknowledge(&self, purchase_token: &str) -> Result<()> {
        self.ensure_ready().await?;
        let result = self.datasource.acknowledge_purchase(purchase_token).await?;
        check(&result, "Failed to acknowledge purchase")
    }

    async fn consume(&self, purchase_token: &str) -> Result<()> {
        self.ensure_ready().await?;
        let result = self.datasource.consume_purchase(purchase_token).await?;
        check(&result, "Failed to consume purchase")
    }

    async fn next_event(&self) -> Option<PlatformEvent> {
        let update = self.datasource.next_purchases_update().await?;
        Some(PlatformEvent::PurchaseFlow(
            PurchaseOutcome::from_google_play_update(update),
        ))
    }
}

impl GooglePlayIapRepositoryImpl<GooglePlayBillingDatasourceImpl> {
    pub(crate) fn new(bridge: Arc<dyn NativeBridge>) -> Self {
        Self {
            datasource: GooglePlayBillingDatasourceImpl::new(bridge),
        }
    }
}

impl<D: GooglePlayBillingDatasource> GooglePlayIapRepositoryImpl<D> {
    async fn ensure_ready(&self) -> Result<()> {
        match self.datasource.is_ready().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(IapError::BackendUnready),
            Err(e) => {
                debug!(error = %e, "billing readiness check failed");
                Err(IapError::BackendUnready)
            }
        }
    }
}

fn check(result: &BillingResultModel, context: &str) -> Result<()> {
    if result.is_ok() {
        Ok(())
    } else {
        Err(IapError::BackendError(format!(
            "{context}: {}",
            result.describe()
        )))
    }
}

fn decode_purchase(record: &Value) -> Result<PurchaseModel> {
    PurchaseModel::deserialize(record)
        .map_err(|e| IapError::BackendError(format!("failed to parse purchase: {e}")))
}

impl Entitlement {
    fn from_google_play_record(record: &Value, product_type: ProductType) -> Result<Self> {
        let m = decode_purchase(record)?;
        Ok(Entitlement {
            purchase: Purchase::from_google_play_purchase(&m)?,
            product_type,
            expiration_time: None,
            product_ids: m.products,
        })
    }
}

impl PurchaseOutcome {
    /// Records that fail to decode or normalize are skipped. If none of the
    /// delivered records survive, the first failure becomes the outcome.
    fn from_google_play_update(update: PurchasesUpdatedModel) -> Self {
        let billing_result = match BillingResultModel::deserialize(&update.billing_result) {
            Ok(billing_result) => billing_result,
            Err(e) => {
                warn!(billing_result = %update.billing_result, error = %e, "unrecognized billing result");
                return PurchaseOutcome::Failed(format!("unrecognized billing result: {e}"));
            }
        };
        match billing_result.response_code {
            BillingResponseCode::Ok => {}
            BillingResponseCode::UserCanceled => return PurchaseOutcome::UserCanceled,
            _ => return PurchaseOutcome::Failed(billing_result.describe()),
        }
        let mut purchases = vec![];
        let mut first_failure = None;
        for record in update.purchases.unwrap_or_default() {
            match decode_purchase(&record).and_then(|m| Purchase::from_google_play_purchase(&m)) {
                Ok(purchase) => purchases.push(purchase),
                Err(e) => {
                    warn!(error = %e, "skipping purchase that could not be normalized");
                    first_failure.get_or_insert(e);
                }
            }
        }
        match first_failure {
            Some(e) if purchases.is_empty() => PurchaseOutcome::Failed(e.to_string()),
            _ => PurchaseOutcome::Purchased(purchases),
        }
    }
}

impl From<ProductType> for NativeProductType {
    fn from(value: ProductType) -> Self {
        match value {
            ProductType::Subscription => NativeProductType::Subs,
            ProductType::InApp => NativeProductType::InApp,
        }
    }
}

impl NativeProductType {
    fn canonical(&self) -> ProductType {
        match self {
            NativeProductType::Subs => ProductType::Subscription,
            NativeProductType::InApp => ProductType::InApp,
            NativeProductType::Unknown(value) => ProductType::from_public(value),
        }
    }
}

impl Product {
    fn from_google_play_product_details(m: gd::ProductDetailsModel) -> Self {
        let one_time = m.one_time_purchase_offer_details;
        Product {
            product_type: m.product_type.canonical(),
            product_id: m.product_id,
            title: m.title,
            description: m.description,
            formatted_price: one_time.as_ref().map(|o| o.formatted_price.clone()),
            price_currency_code: one_time.as_ref().map(|o| o.price_currency_code.clone()),
            price_amount_micros: one_time.as_ref().map(|o| o.price_amount_micros),
            subscription_offer_details: m.subscription_offer_details.map(|offers| {
                offers
                    .into_iter()
                    .map(SubscriptionOffer::from_google_play_offer)
                    .collect()
            }),
        }
    }
}

impl SubscriptionOffer {
    fn from_google_play_offer(m: gd::SubscriptionOfferDetailsModel) -> Self {
        SubscriptionOffer {
            offer_token: m.offer_token,
            base_plan_id: m.base_plan_id,
            offer_id: m.offer_id,
            pricing_phases: m
                .pricing_phases
                .pricing_phase_list
                .into_iter()
                .map(|phase| PricingPhase {
                    formatted_price: phase.formatted_price,
                    price_currency_code: phase.price_currency_code,
                    price_amount_micros: phase.price_amount_micros,
                    billing_period: phase.billing_period,
                    billing_cycle_count: phase.billing_cycle_count,
                    recurrence_mode: match phase.recurrence_mode {
                        gd::RecurrenceMode::InfiniteRecurring => PricingPhase::INFINITE_RECURRING,
                        gd::RecurrenceMode::FiniteRecurring => PricingPhase::FINITE_RECURRING,
                        gd::RecurrenceMode::NonRecurring => PricingPhase::NON_RECURRING,
                    },
                })
                .collect(),
        }
    }
}
