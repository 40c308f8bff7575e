use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use tracing::{debug, warn};

use crate::{
    bridge::NativeBridge,
    data::{
        datasources::store_kit_datasource::{StoreKitDatasource, StoreKitDatasourceImpl},
        models::store_kit::{
            common::{PaymentMode, ProductTypeModel},
            product_model::{ProductModel, SubscriptionInfoModel},
            purchase_result_model::{PurchaseParams, PurchaseResultModel},
            transaction_model::{TransactionModel, VerificationResultModel},
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
    errors::Result,
};

/// StoreKit 2 backend (iOS / macOS).
pub(crate) struct StoreKitIapRepositoryImpl<D: StoreKitDatasource> {
    datasource: D,
    bundle_id: String,
}

#[async_trait]
impl<D: StoreKitDatasource + 'static> IapRepository for StoreKitIapRepositoryImpl<D> {
    async fn is_ready(&self) -> bool {
        // StoreKit has no connection to establish.
        true
    }

    async fn query_products(
        &self,
        product_ids: &[String],
        product_type: ProductType,
    ) -> Result<Vec<Product>> {
        if product_ids.is_empty() {
            return Ok(vec![]);
        }
        let products = self.datasource.products(product_ids).await?;
        Ok(products
            .into_iter()
            .filter(|m| match m.product_type.canonical() {
                Some(t) => t == product_type,
                None => {
                    warn!(product_id = %m.id, product_type = ?m.product_type, "skipping product of unknown type");
                    false
                }
            })
            .map(|m| Product::from_store_kit_product(m, product_type))
            .collect())
    }

    async fn launch_purchase(&self, request: LaunchRequest) -> Result<LaunchOutcome> {
        debug!(product_id = %request.product.product_id, "presenting StoreKit purchase sheet");
        let params = PurchaseParams {
            product_id: request.product.product_id,
            app_account_token: request.app_account_token,
        };
        let outcome = match self.datasource.purchase(params).await? {
            PurchaseResultModel::Success {
                verification:
                    VerificationResultModel::Verified {
                        transaction,
                        jws_representation,
                    },
            } => {
                let purchase = self.normalize(&transaction, &jws_representation).await;
                self.finish(&transaction).await;
                PurchaseOutcome::Purchased(vec![purchase])
            }
            PurchaseResultModel::Success {
                verification:
                    VerificationResultModel::Unverified {
                        transaction,
                        verification_error,
                    },
            } => {
                warn!(
                    product_id = %transaction.product_id,
                    transaction_id = transaction.id,
                    %verification_error,
                    "purchase returned an unverified transaction"
                );
                PurchaseOutcome::Failed(format!(
                    "Transaction verification failed: {verification_error}"
                ))
            }
            PurchaseResultModel::UserCancelled => PurchaseOutcome::UserCanceled,
            PurchaseResultModel::Pending => PurchaseOutcome::Failed("purchase is pending".to_string()),
        };
        Ok(LaunchOutcome::Completed(outcome))
    }

    async fn current_entitlements(&self, product_type: ProductType) -> Result<Vec<Entitlement>> {
        let mut entitlements = vec![];
        for result in self.datasource.current_entitlements().await? {
            let Some((transaction, jws_representation)) = verified(result) else {
                continue;
            };
            if transaction.product_type.canonical() != Some(product_type) {
                continue;
            }
            let purchase = self.normalize(&transaction, &jws_representation).await;
            entitlements.push(Entitlement {
                purchase,
                product_type,
                expiration_time: transaction
                    .revocation_date
                    .or(transaction.expiration_date)
                    .map(|date| date.timestamp_millis()),
                product_ids: vec![transaction.product_id],
            });
        }
        Ok(entitlements)
    }

    async fn purchase_history(&self) -> Result<Vec<PurchaseHistoryRecord>> {
        Ok(self
            .datasource
            .all_transactions()
            .await?
            .into_iter()
            .filter_map(verified)
            .map(|(transaction, _)| PurchaseHistoryRecord::from_store_kit_transaction(&transaction))
            .collect())
    }

    async fn acknowledge(&self, purchase_token: &str) -> Result<()> {
        debug!(purchase_token, "StoreKit acknowledges automatically, nothing to do");
        Ok(())
    }

    async fn consume(&self, purchase_token: &str) -> Result<()> {
        debug!(purchase_token, "StoreKit finishes consumables on purchase, nothing to do");
        Ok(())
    }

    async fn next_event(&self) -> Option<PlatformEvent> {
        loop {
            let update = self.datasource.next_transaction_update().await?;
            let Some((transaction, jws_representation)) = verified(update) else {
                continue;
            };
            let purchase = self.normalize(&transaction, &jws_representation).await;
            self.finish(&transaction).await;
            return Some(PlatformEvent::TransactionUpdated(purchase));
        }
    }
}

impl StoreKitIapRepositoryImpl<StoreKitDatasourceImpl> {
    pub(crate) fn new(bridge: Arc<dyn NativeBridge>, bundle_id: String) -> Self {
        Self {
            datasource: StoreKitDatasourceImpl::new(bridge),
            bundle_id,
        }
    }
}

impl<D: StoreKitDatasource> StoreKitIapRepositoryImpl<D> {
    /// Fetches renewal status for auto-renewables, then normalizes against the
    /// current time. A failed status lookup leaves the state to the
    /// transaction dates.
    async fn normalize(&self, transaction: &TransactionModel, jws_representation: &str) -> Purchase {
        let statuses = if transaction.product_type == ProductTypeModel::AutoRenewable {
            match self
                .datasource
                .subscription_status(&transaction.product_id)
                .await
            {
                Ok(statuses) => statuses,
                Err(e) => {
                    warn!(product_id = %transaction.product_id, error = %e, "subscription status unavailable");
                    vec![]
                }
            }
        } else {
            vec![]
        };
        Purchase::from_store_kit_transaction(
            transaction,
            jws_representation,
            &statuses,
            &self.bundle_id,
            Utc::now(),
        )
    }

    async fn finish(&self, transaction: &TransactionModel) {
        if let Err(e) = self.datasource.finish_transaction(transaction.id).await {
            warn!(transaction_id = transaction.id, error = %e, "failed to finish transaction");
        }
    }
}

/// Unverified transactions are logged and dropped.
fn verified(result: VerificationResultModel) -> Option<(TransactionModel, String)> {
    match result {
        VerificationResultModel::Verified {
            transaction,
            jws_representation,
        } => Some((transaction, jws_representation)),
        VerificationResultModel::Unverified {
            transaction,
            verification_error,
        } => {
            warn!(
                product_id = %transaction.product_id,
                transaction_id = transaction.id,
                %verification_error,
                "skipping unverified transaction"
            );
            None
        }
    }
}

impl ProductTypeModel {
    fn canonical(&self) -> Option<ProductType> {
        match self {
            ProductTypeModel::AutoRenewable | ProductTypeModel::NonRenewable => {
                Some(ProductType::Subscription)
            }
            ProductTypeModel::Consumable | ProductTypeModel::NonConsumable => {
                Some(ProductType::InApp)
            }
            ProductTypeModel::Unknown(_) => None,
        }
    }
}

impl Product {
    fn from_store_kit_product(m: ProductModel, product_type: ProductType) -> Self {
        let subscription_offer_details = m
            .subscription
            .as_ref()
            .map(|info| store_kit_offers(info, &m));
        let price_amount_micros = m.price.as_deref().and_then(price_micros);
        Product {
            product_id: m.id,
            title: m.display_name,
            description: m.description,
            product_type,
            formatted_price: Some(m.display_price),
            price_currency_code: m.currency_code,
            price_amount_micros,
            subscription_offer_details,
        }
    }
}

/// Introductory offer, promotional offers, then the regular renewal price.
fn store_kit_offers(info: &SubscriptionInfoModel, product: &ProductModel) -> Vec<SubscriptionOffer> {
    let currency = product.currency_code.clone().unwrap_or_default();
    let discounted = info
        .introductory_offer
        .iter()
        .chain(&info.promotional_offers)
        .map(|offer| SubscriptionOffer {
            offer_token: String::new(),
            base_plan_id: String::new(),
            offer_id: offer.id.clone(),
            pricing_phases: vec![PricingPhase {
                formatted_price: offer.display_price.clone(),
                price_currency_code: currency.clone(),
                price_amount_micros: offer.price.as_deref().and_then(price_micros).unwrap_or(0),
                billing_period: offer.period.iso8601(),
                billing_cycle_count: offer.period_count,
                recurrence_mode: match &offer.payment_mode {
                    PaymentMode::FreeTrial | PaymentMode::PayUpFront => PricingPhase::NON_RECURRING,
                    PaymentMode::PayAsYouGo => PricingPhase::FINITE_RECURRING,
                    PaymentMode::Unknown(mode) => {
                        warn!(product_id = %product.id, payment_mode = %mode, "unknown offer payment mode");
                        PricingPhase::FINITE_RECURRING
                    }
                },
            }],
        });
    let regular = SubscriptionOffer {
        offer_token: String::new(),
        base_plan_id: String::new(),
        offer_id: None,
        pricing_phases: vec![PricingPhase {
            formatted_price: product.display_price.clone(),
            price_currency_code: currency.clone(),
            price_amount_micros: product.price.as_deref().and_then(price_micros).unwrap_or(0),
            billing_period: info.subscription_period.iso8601(),
            billing_cycle_count: 0,
            recurrence_mode: PricingPhase::INFINITE_RECURRING,
        }],
    };
    discounted.chain(std::iter::once(regular)).collect()
}

fn price_micros(price: &str) -> Option<i64> {
    match Decimal::from_str(price) {
        Ok(price) => price
            .checked_mul(Decimal::from(1_000_000))
            .and_then(|micros| micros.round().to_i64()),
        Err(e) => {
            warn!(price, error = %e, "unparseable StoreKit price");
            None
        }
    }
}

impl PurchaseHistoryRecord {
    fn from_store_kit_transaction(t: &TransactionModel) -> Self {
        PurchaseHistoryRecord {
            product_id: t.product_id.clone(),
            purchase_time: t.purchase_date.timestamp_millis(),
            purchase_token: t.id.to_string(),
            quantity: t.purchased_quantity,
            original_json: None,
            signature: None,
        }
    }
}
