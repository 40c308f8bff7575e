use std::sync::{Arc, Mutex, PoisonError};

use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{info, instrument, warn};

use crate::{
    bridge::NativeBridge,
    config::IapConfig,
    data::repositories::{
        google_play_iap_repository_impl::GooglePlayIapRepositoryImpl,
        store_kit_iap_repository_impl::StoreKitIapRepositoryImpl,
    },
    domain::{
        entities::{
            platform_event::LaunchOutcome,
            product::Product,
            product_status::ProductStatus,
            product_type::ProductType,
            purchase::{Purchase, PurchaseHistoryRecord},
            purchase_options::{LaunchRequest, PurchaseOptions},
        },
        repositories::iap_repository::IapRepository,
        services::{entitlement_scanner, lifecycle_finalizer, purchase_correlator::PurchaseCorrelator},
    },
    errors::{IapError, Result},
};

/// In-app purchase engine for one billing platform.
///
/// Construction spawns a listener task on the current tokio runtime that feeds
/// platform deliveries to the purchase correlator. It runs until
/// [`IapUtil::shutdown`] is called, the `IapUtil` is dropped, or the platform
/// closes its update stream; after that, purchases fail with
/// [`IapError::PurchaseFailed`].
pub struct IapUtil {
    repository: Arc<dyn IapRepository>,
    correlator: Arc<PurchaseCorrelator>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl IapUtil {
    /// Engine over a custom backend.
    pub async fn new(repository: Arc<dyn IapRepository>, config: IapConfig) -> Result<Self> {
        let config = config.validated()?;
        let correlator = Arc::new(PurchaseCorrelator::new(config.update_channel_capacity));
        let listener = spawn_listener(repository.clone(), correlator.clone());
        Ok(Self {
            repository,
            correlator,
            listener: Mutex::new(Some(listener)),
        })
    }

    /// Engine over the Android Play Billing Library.
    pub async fn google_play(bridge: Arc<dyn NativeBridge>, config: IapConfig) -> Result<Self> {
        Self::new(Arc::new(GooglePlayIapRepositoryImpl::new(bridge)), config).await
    }

    /// Engine over StoreKit 2. `config.application_id` is reported as the
    /// package name of every purchase.
    pub async fn store_kit(bridge: Arc<dyn NativeBridge>, config: IapConfig) -> Result<Self> {
        let bundle_id = config.application_id.clone();
        Self::new(
            Arc::new(StoreKitIapRepositoryImpl::new(bridge, bundle_id)),
            config,
        )
        .await
    }

    /// Product details for `product_ids`. Ids the store does not know are
    /// absent from the result.
    #[instrument(skip(self, product_ids, product_type), fields(count = product_ids.len(), %product_type))]
    pub async fn get_products(
        &self,
        product_ids: &[String],
        product_type: ProductType,
    ) -> Result<Vec<Product>> {
        if product_ids.is_empty() {
            return Ok(vec![]);
        }
        self.repository.query_products(product_ids, product_type).await
    }

    /// Runs the native purchase flow for `product_id` and waits for its
    /// result. Only one purchase may be in flight per engine.
    ///
    /// Purchases delivered for other products while waiting (renewals,
    /// purchases finishing on another device) are published on
    /// [`IapUtil::subscribe_purchase_updates`].
    #[instrument(skip(self, product_type, options), fields(%product_type))]
    pub async fn purchase(
        &self,
        product_id: &str,
        product_type: ProductType,
        options: PurchaseOptions,
    ) -> Result<Purchase> {
        if product_id.is_empty() {
            return Err(IapError::InvalidArgument(
                "product id is required".to_string(),
            ));
        }
        let app_account_token = options.app_account_token()?;
        if !self.repository.is_ready().await {
            return Err(IapError::BackendUnready);
        }

        let ticket = self.correlator.begin(product_id)?;
        let product = self
            .repository
            .query_products(&[product_id.to_string()], product_type)
            .await?
            .into_iter()
            .find(|product| product.product_id == product_id)
            .ok_or_else(|| IapError::ProductNotFound(product_id.to_string()))?;

        let request = LaunchRequest::resolve(product, options, app_account_token);
        match self.repository.launch_purchase(request).await {
            Ok(LaunchOutcome::AwaitCallback) => ticket.launched(),
            Ok(LaunchOutcome::Completed(outcome)) => {
                ticket.launched();
                ticket.complete(outcome);
            }
            Err(IapError::BackendError(detail)) => return Err(IapError::LaunchFailed(detail)),
            Err(e) => return Err(e),
        }
        ticket.outcome().await
    }

    /// Current purchases of `product_type`, for restoring entitlements.
    #[instrument(skip(self, product_type), fields(%product_type))]
    pub async fn restore_purchases(&self, product_type: ProductType) -> Result<Vec<Purchase>> {
        entitlement_scanner::list_current_entitlements(self.repository.as_ref(), product_type).await
    }

    /// Every past transaction. Fails with [`IapError::Unsupported`] on
    /// platforms that cannot enumerate them.
    #[instrument(skip(self))]
    pub async fn get_purchase_history(&self) -> Result<Vec<PurchaseHistoryRecord>> {
        self.repository.purchase_history().await
    }

    /// Safe to call on every platform, and more than once.
    #[instrument(skip_all)]
    pub async fn acknowledge_purchase(&self, purchase_token: &str) -> Result<()> {
        lifecycle_finalizer::acknowledge(self.repository.as_ref(), purchase_token).await
    }

    #[instrument(skip_all)]
    pub async fn consume_purchase(&self, purchase_token: &str) -> Result<()> {
        lifecycle_finalizer::consume(self.repository.as_ref(), purchase_token).await
    }

    #[instrument(skip(self, product_type), fields(%product_type))]
    pub async fn get_product_status(
        &self,
        product_id: &str,
        product_type: ProductType,
    ) -> Result<ProductStatus> {
        if product_id.is_empty() {
            return Err(IapError::InvalidArgument(
                "product id is required".to_string(),
            ));
        }
        entitlement_scanner::status_of(self.repository.as_ref(), product_id, product_type).await
    }

    /// Purchases the platform delivered outside an explicit purchase call.
    pub fn subscribe_purchase_updates(&self) -> broadcast::Receiver<Purchase> {
        self.correlator.subscribe()
    }

    /// Stops the update listener. An outstanding purchase is rejected and
    /// later purchases fail immediately. Subscribers see the channel close
    /// once the engine is dropped.
    pub fn shutdown(&self) {
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(listener) = listener {
            listener.abort();
            info!("purchase update listener stopped");
        }
        self.correlator.close();
    }
}

impl Drop for IapUtil {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_listener(
    repository: Arc<dyn IapRepository>,
    correlator: Arc<PurchaseCorrelator>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("purchase update listener started");
        while let Some(event) = repository.next_event().await {
            correlator.deliver(event);
        }
        warn!("platform closed the purchase update stream");
        correlator.close();
    })
}
