#![allow(dead_code)]

use async_trait::async_trait;
use fractic_iap_client::{
    bridge::NativeBridge,
    domain::{
        entities::{
            entitlement::Entitlement,
            platform_event::{LaunchOutcome, PlatformEvent},
            product::Product,
            product_type::ProductType,
            purchase::{Purchase, PurchaseHistoryRecord, PurchaseState},
            purchase_options::LaunchRequest,
        },
        repositories::iap_repository::IapRepository,
    },
    errors::{IapError, Result},
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tokio::sync::{
    mpsc::{self, UnboundedReceiver, UnboundedSender},
    Mutex as TokioMutex,
};

type Handler = Arc<dyn Fn(&MockNativeBridge, Value) -> std::result::Result<Value, String> + Send + Sync>;

/// In-memory native bridge. Methods answer with scripted responses; events are
/// pushed by the test.
#[derive(Default)]
pub struct MockNativeBridge {
    handlers: Mutex<HashMap<String, Handler>>,
    calls: Mutex<Vec<(String, Value)>>,
    listeners: Mutex<HashMap<String, Vec<UnboundedSender<Value>>>>,
}

impl MockNativeBridge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answers every call to `method` with `response`.
    pub fn respond(&self, method: &str, response: Value) {
        self.respond_with(method, move |_, _| Ok(response.clone()));
    }

    /// Fails every call to `method` with `message`.
    pub fn fail(&self, method: &str, message: &str) {
        let message = message.to_string();
        self.respond_with(method, move |_, _| Err(message.clone()));
    }

    /// Answers `method` with `response`, then emits `event` as the native side
    /// would once the user finishes the flow.
    pub fn respond_and_emit(&self, method: &str, response: Value, event: &str, payload: Value) {
        let event = event.to_string();
        self.respond_with(method, move |bridge, _| {
            bridge.emit(&event, payload.clone());
            Ok(response.clone())
        });
    }

    pub fn respond_with<F>(&self, method: &str, handler: F)
    where
        F: Fn(&MockNativeBridge, Value) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .unwrap()
            .insert(method.to_string(), Arc::new(handler));
    }

    pub fn emit(&self, event: &str, payload: Value) {
        if let Some(senders) = self.listeners.lock().unwrap().get(event) {
            for sender in senders {
                let _ = sender.send(payload.clone());
            }
        }
    }

    /// Drops every event sender, ending the engine's update stream.
    pub fn close_events(&self) {
        self.listeners.lock().unwrap().clear();
    }

    /// Payloads of every call made to `method`, in order.
    pub fn calls(&self, method: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl NativeBridge for MockNativeBridge {
    async fn invoke(&self, method: &str, payload: Value) -> std::result::Result<Value, String> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), payload.clone()));
        let handler = self.handlers.lock().unwrap().get(method).cloned();
        match handler {
            Some(handler) => handler(self, payload),
            None => Err(format!("no handler registered for {method}")),
        }
    }

    fn listen(&self, event: &str) -> UnboundedReceiver<Value> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.listeners
            .lock()
            .unwrap()
            .entry(event.to_string())
            .or_default()
            .push(sender);
        receiver
    }
}

/// Platform-agnostic repository double driven directly with canonical types.
pub struct MockRepository {
    pub ready: AtomicBool,
    pub products: Mutex<Vec<Product>>,
    pub entitlements: Mutex<Vec<Entitlement>>,
    pub history: Mutex<Option<Vec<PurchaseHistoryRecord>>>,
    pub launch_result: Mutex<Option<Result<LaunchOutcome>>>,
    pub launches: Mutex<Vec<LaunchRequest>>,
    pub acknowledged: Mutex<Vec<String>>,
    pub consumed: Mutex<Vec<String>>,
    pub product_queries: Mutex<usize>,
    events: UnboundedSender<PlatformEvent>,
    event_stream: TokioMutex<UnboundedReceiver<PlatformEvent>>,
}

impl MockRepository {
    pub fn new() -> Arc<Self> {
        let (events, event_stream) = mpsc::unbounded_channel();
        Arc::new(Self {
            ready: AtomicBool::new(true),
            products: Mutex::new(vec![]),
            entitlements: Mutex::new(vec![]),
            history: Mutex::new(None),
            launch_result: Mutex::new(None),
            launches: Mutex::new(vec![]),
            acknowledged: Mutex::new(vec![]),
            consumed: Mutex::new(vec![]),
            product_queries: Mutex::new(0),
            events,
            event_stream: TokioMutex::new(event_stream),
        })
    }

    pub fn with_products(self: Arc<Self>, products: Vec<Product>) -> Arc<Self> {
        *self.products.lock().unwrap() = products;
        self
    }

    pub fn push_event(&self, event: PlatformEvent) {
        self.events.send(event).unwrap();
    }

    pub fn launch_count(&self) -> usize {
        self.launches.lock().unwrap().len()
    }
}

#[async_trait]
impl IapRepository for MockRepository {
    async fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn query_products(
        &self,
        product_ids: &[String],
        product_type: ProductType,
    ) -> Result<Vec<Product>> {
        *self.product_queries.lock().unwrap() += 1;
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.product_type == product_type && product_ids.contains(&p.product_id))
            .cloned()
            .collect())
    }

    async fn launch_purchase(&self, request: LaunchRequest) -> Result<LaunchOutcome> {
        self.launches.lock().unwrap().push(request);
        self.launch_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Ok(LaunchOutcome::AwaitCallback))
    }

    async fn current_entitlements(&self, product_type: ProductType) -> Result<Vec<Entitlement>> {
        Ok(self
            .entitlements
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.product_type == product_type)
            .cloned()
            .collect())
    }

    async fn purchase_history(&self) -> Result<Vec<PurchaseHistoryRecord>> {
        self.history
            .lock()
            .unwrap()
            .clone()
            .ok_or(IapError::Unsupported("purchase history"))
    }

    async fn acknowledge(&self, purchase_token: &str) -> Result<()> {
        self.acknowledged
            .lock()
            .unwrap()
            .push(purchase_token.to_string());
        Ok(())
    }

    async fn consume(&self, purchase_token: &str) -> Result<()> {
        self.consumed.lock().unwrap().push(purchase_token.to_string());
        Ok(())
    }

    async fn next_event(&self) -> Option<PlatformEvent> {
        self.event_stream.lock().await.recv().await
    }
}

pub fn subscription(product_id: &str, offer_tokens: &[&str]) -> Product {
    use fractic_iap_client::domain::entities::product::SubscriptionOffer;
    Product {
        product_id: product_id.to_string(),
        title: format!("{product_id} title"),
        description: format!("{product_id} description"),
        product_type: ProductType::Subscription,
        formatted_price: None,
        price_currency_code: None,
        price_amount_micros: None,
        subscription_offer_details: Some(
            offer_tokens
                .iter()
                .map(|token| SubscriptionOffer {
                    offer_token: token.to_string(),
                    base_plan_id: "monthly".to_string(),
                    offer_id: None,
                    pricing_phases: vec![],
                })
                .collect(),
        ),
    }
}

pub fn one_time(product_id: &str) -> Product {
    Product {
        product_id: product_id.to_string(),
        title: format!("{product_id} title"),
        description: format!("{product_id} description"),
        product_type: ProductType::InApp,
        formatted_price: Some("$0.99".to_string()),
        price_currency_code: Some("USD".to_string()),
        price_amount_micros: Some(990_000),
        subscription_offer_details: None,
    }
}

pub fn purchase(product_id: &str, state: PurchaseState) -> Purchase {
    Purchase {
        order_id: Some(format!("order-{product_id}")),
        package_name: "com.example.app".to_string(),
        product_id: product_id.to_string(),
        purchase_time: 1_700_000_000_000,
        purchase_token: format!("token-{product_id}"),
        purchase_state: state,
        is_auto_renewing: false,
        is_acknowledged: false,
        original_json: None,
        signature: None,
        original_id: None,
        jws_representation: None,
    }
}

pub fn entitlement(purchase: Purchase, product_type: ProductType) -> Entitlement {
    Entitlement {
        product_ids: vec![purchase.product_id.clone()],
        purchase,
        product_type,
        expiration_time: None,
    }
}

/// Routes engine logs to the test output. Set `RUST_LOG` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Polls `condition` until it holds, failing the test after a second.
pub async fn eventually(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
