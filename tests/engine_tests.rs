mod mock_implementations;

use std::sync::{atomic::Ordering, Arc};

use tokio::task::JoinHandle;

use fractic_iap_client::{
    config::IapConfig,
    domain::entities::{
        platform_event::{LaunchOutcome, PlatformEvent, PurchaseOutcome},
        product_status::ProductStatus,
        product_type::ProductType,
        purchase::{Purchase, PurchaseState},
        purchase_options::PurchaseOptions,
    },
    errors::{IapError, Result},
    util::IapUtil,
};
use mock_implementations::{
    entitlement, eventually, init_tracing, one_time, purchase, subscription, MockRepository,
};

async fn engine(repository: &Arc<MockRepository>) -> Arc<IapUtil> {
    init_tracing();
    Arc::new(
        IapUtil::new(repository.clone(), IapConfig::new("com.example.app"))
            .await
            .unwrap(),
    )
}

fn spawn_purchase(
    iap: &Arc<IapUtil>,
    product_id: &'static str,
    product_type: ProductType,
    options: PurchaseOptions,
) -> JoinHandle<Result<Purchase>> {
    let iap = iap.clone();
    tokio::spawn(async move { iap.purchase(product_id, product_type, options).await })
}

#[tokio::test]
async fn test_purchase_resolves_and_product_is_then_owned() {
    let repository = MockRepository::new().with_products(vec![subscription("p1", &["intro"])]);
    let iap = engine(&repository).await;

    let pending = spawn_purchase(&iap, "p1", ProductType::Subscription, PurchaseOptions::default());
    eventually(|| repository.launch_count() == 1).await;

    let bought = purchase("p1", PurchaseState::Purchased);
    repository
        .entitlements
        .lock()
        .unwrap()
        .push(entitlement(bought.clone(), ProductType::Subscription));
    repository.push_event(PlatformEvent::PurchaseFlow(PurchaseOutcome::Purchased(vec![
        bought.clone(),
    ])));

    let resolved = pending.await.unwrap().unwrap();
    assert_eq!(resolved, bought);

    let status = iap
        .get_product_status("p1", ProductType::Subscription)
        .await
        .unwrap();
    assert!(status.is_owned);
    assert_eq!(status.purchase_state, Some(PurchaseState::Purchased));
    assert_eq!(status.purchase_token.as_deref(), Some("token-p1"));
}

#[tokio::test]
async fn test_second_purchase_fails_fast_while_first_is_outstanding() {
    let repository = MockRepository::new()
        .with_products(vec![subscription("p1", &[]), subscription("p2", &[])]);
    let iap = engine(&repository).await;

    let first = spawn_purchase(&iap, "p1", ProductType::Subscription, PurchaseOptions::default());
    eventually(|| repository.launch_count() == 1).await;

    let second = iap
        .purchase("p2", ProductType::Subscription, PurchaseOptions::default())
        .await;
    assert_eq!(second, Err(IapError::ConcurrentPurchaseInProgress));
    assert_eq!(repository.launch_count(), 1);

    repository.push_event(PlatformEvent::PurchaseFlow(PurchaseOutcome::Purchased(vec![
        purchase("p1", PurchaseState::Purchased),
    ])));
    assert_eq!(first.await.unwrap().unwrap().product_id, "p1");

    // Slot is free again.
    let third = spawn_purchase(&iap, "p2", ProductType::Subscription, PurchaseOptions::default());
    eventually(|| repository.launch_count() == 2).await;
    repository.push_event(PlatformEvent::PurchaseFlow(PurchaseOutcome::UserCanceled));
    assert_eq!(third.await.unwrap(), Err(IapError::UserCanceled));
}

#[tokio::test]
async fn test_explicit_offer_token_is_used_verbatim() {
    let repository = MockRepository::new().with_products(vec![subscription("p1", &["intro", "base"])]);
    let iap = engine(&repository).await;

    let pending = spawn_purchase(
        &iap,
        "p1",
        ProductType::Subscription,
        PurchaseOptions::default().with_offer_token("T"),
    );
    eventually(|| repository.launch_count() == 1).await;
    assert_eq!(
        repository.launches.lock().unwrap()[0].offer_token.as_deref(),
        Some("T")
    );

    repository.push_event(PlatformEvent::PurchaseFlow(PurchaseOutcome::Failed(
        "item unavailable".to_string(),
    )));
    assert_eq!(
        pending.await.unwrap(),
        Err(IapError::PurchaseFailed("item unavailable".to_string()))
    );
}

#[tokio::test]
async fn test_offer_token_falls_back_to_first_offer() {
    let repository = MockRepository::new().with_products(vec![subscription("p1", &["intro", "base"])]);
    let iap = engine(&repository).await;

    let pending = spawn_purchase(&iap, "p1", ProductType::Subscription, PurchaseOptions::default());
    eventually(|| repository.launch_count() == 1).await;
    assert_eq!(
        repository.launches.lock().unwrap()[0].offer_token.as_deref(),
        Some("intro")
    );
    pending.abort();
}

#[tokio::test]
async fn test_invalid_app_account_token_never_reaches_backend() {
    let repository = MockRepository::new().with_products(vec![one_time("coins")]);
    let iap = engine(&repository).await;

    let result = iap
        .purchase(
            "coins",
            ProductType::InApp,
            PurchaseOptions::default().with_app_account_token("not-a-uuid"),
        )
        .await;

    assert!(matches!(result, Err(IapError::InvalidArgument(_))));
    assert_eq!(*repository.product_queries.lock().unwrap(), 0);
    assert_eq!(repository.launch_count(), 0);
}

#[tokio::test]
async fn test_purchase_preconditions() {
    let repository = MockRepository::new().with_products(vec![one_time("coins")]);
    let iap = engine(&repository).await;

    assert_eq!(
        iap.purchase("missing", ProductType::InApp, PurchaseOptions::default())
            .await,
        Err(IapError::ProductNotFound("missing".to_string()))
    );

    repository.ready.store(false, Ordering::SeqCst);
    assert_eq!(
        iap.purchase("coins", ProductType::InApp, PurchaseOptions::default())
            .await,
        Err(IapError::BackendUnready)
    );
    repository.ready.store(true, Ordering::SeqCst);

    *repository.launch_result.lock().unwrap() =
        Some(Err(IapError::BackendError("DeveloperError".to_string())));
    assert_eq!(
        iap.purchase("coins", ProductType::InApp, PurchaseOptions::default())
            .await,
        Err(IapError::LaunchFailed("DeveloperError".to_string()))
    );

    // Every failed attempt released the slot.
    *repository.launch_result.lock().unwrap() = Some(Ok(LaunchOutcome::Completed(
        PurchaseOutcome::Purchased(vec![purchase("coins", PurchaseState::Purchased)]),
    )));
    let bought = iap
        .purchase("coins", ProductType::InApp, PurchaseOptions::default())
        .await
        .unwrap();
    assert_eq!(bought.product_id, "coins");
}

#[tokio::test]
async fn test_dropped_purchase_call_releases_slot() {
    let repository = MockRepository::new().with_products(vec![one_time("coins")]);
    let iap = engine(&repository).await;

    let abandoned = spawn_purchase(&iap, "coins", ProductType::InApp, PurchaseOptions::default());
    eventually(|| repository.launch_count() == 1).await;
    abandoned.abort();
    let _ = abandoned.await;

    let retry = spawn_purchase(&iap, "coins", ProductType::InApp, PurchaseOptions::default());
    eventually(|| repository.launch_count() == 2).await;
    repository.push_event(PlatformEvent::PurchaseFlow(PurchaseOutcome::Purchased(vec![
        purchase("coins", PurchaseState::Purchased),
    ])));
    assert!(retry.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_unsolicited_transaction_is_published() {
    let repository = MockRepository::new();
    let iap = engine(&repository).await;
    let mut updates = iap.subscribe_purchase_updates();

    let renewal = purchase("never-requested", PurchaseState::Purchased);
    repository.push_event(PlatformEvent::TransactionUpdated(renewal.clone()));

    assert_eq!(updates.recv().await.unwrap(), renewal);
}

#[tokio::test]
async fn test_get_products_returns_only_known_products() {
    let repository = MockRepository::new().with_products(vec![one_time("p1")]);
    let iap = engine(&repository).await;

    let products = iap
        .get_products(&["p1".to_string(), "p2".to_string()], ProductType::InApp)
        .await
        .unwrap();
    assert_eq!(products, vec![one_time("p1")]);

    assert!(iap.get_products(&[], ProductType::InApp).await.unwrap().is_empty());
    assert_eq!(*repository.product_queries.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_restore_filters_by_product_type() {
    let repository = MockRepository::new();
    repository.entitlements.lock().unwrap().extend([
        entitlement(purchase("premium", PurchaseState::Purchased), ProductType::Subscription),
        entitlement(purchase("lifetime", PurchaseState::Purchased), ProductType::InApp),
    ]);
    let iap = engine(&repository).await;

    let subs = iap.restore_purchases(ProductType::Subscription).await.unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].product_id, "premium");

    let inapp = iap.restore_purchases(ProductType::InApp).await.unwrap();
    assert_eq!(inapp.len(), 1);
    assert_eq!(inapp[0].product_id, "lifetime");
}

#[tokio::test]
async fn test_status_of_unowned_product() {
    let repository = MockRepository::new();
    repository.entitlements.lock().unwrap().push(entitlement(
        purchase("p1", PurchaseState::Canceled),
        ProductType::Subscription,
    ));
    let iap = engine(&repository).await;

    let status = iap
        .get_product_status("p1", ProductType::Subscription)
        .await
        .unwrap();
    assert_eq!(status, ProductStatus::not_owned("p1"));
    assert_eq!(
        serde_json::to_value(&status).unwrap(),
        serde_json::json!({"productId": "p1", "isOwned": false})
    );
}

#[tokio::test]
async fn test_pending_entitlement_is_owned_and_reported_as_pending() {
    let repository = MockRepository::new();
    repository.entitlements.lock().unwrap().push(entitlement(
        purchase("coins", PurchaseState::Pending),
        ProductType::InApp,
    ));
    let iap = engine(&repository).await;

    let status = iap.get_product_status("coins", ProductType::InApp).await.unwrap();
    assert!(status.is_owned);
    assert_eq!(status.purchase_state, Some(PurchaseState::Pending));
}

#[tokio::test]
async fn test_finalization_is_repeatable_and_leaves_slot_alone() {
    let repository = MockRepository::new().with_products(vec![one_time("coins")]);
    let iap = engine(&repository).await;

    let pending = spawn_purchase(&iap, "coins", ProductType::InApp, PurchaseOptions::default());
    eventually(|| repository.launch_count() == 1).await;

    for _ in 0..2 {
        iap.acknowledge_purchase("token-old").await.unwrap();
        iap.consume_purchase("token-old").await.unwrap();
    }
    assert_eq!(repository.acknowledged.lock().unwrap().len(), 2);
    assert_eq!(repository.consumed.lock().unwrap().len(), 2);

    assert_eq!(
        iap.acknowledge_purchase("").await,
        Err(IapError::InvalidArgument("purchase token is required".to_string()))
    );
    assert!(matches!(
        iap.consume_purchase("").await,
        Err(IapError::InvalidArgument(_))
    ));

    // The outstanding request is untouched.
    assert_eq!(
        iap.purchase("coins", ProductType::InApp, PurchaseOptions::default())
            .await,
        Err(IapError::ConcurrentPurchaseInProgress)
    );
    repository.push_event(PlatformEvent::PurchaseFlow(PurchaseOutcome::Purchased(vec![
        purchase("coins", PurchaseState::Purchased),
    ])));
    assert!(pending.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_history_unsupported_is_surfaced() {
    let repository = MockRepository::new();
    let iap = engine(&repository).await;
    assert_eq!(
        iap.get_purchase_history().await,
        Err(IapError::Unsupported("purchase history"))
    );
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let repository = MockRepository::new();
    let mut config = IapConfig::new("com.example.app");
    config.update_channel_capacity = 0;
    assert!(matches!(
        IapUtil::new(repository, config).await,
        Err(IapError::InvalidArgument(_))
    ));
}
