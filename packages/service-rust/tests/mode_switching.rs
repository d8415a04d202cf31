//! End-to-end behaviour of the data layer across mode switches.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backoffice_core::{
    ArchiveRequest, ArchivedItem, FixedClock, Mode, NewProduct, NewSale, PaymentMethod, Product,
    ProductPatch, Sale, SaleLine, SettingsPatch, SettingsRecord,
};
use backoffice_service::backend::{ArchiveBackend, ProductBackend, SalesBackend, SettingsBackend};
use backoffice_service::{
    DataConfig, DataLayer, ErrorKind, KeyValueStore, MemoryStore, ModeProbe, ProbeError,
    RemoteError,
};
use parking_lot::Mutex;

const ANCHOR: i64 = 1_700_000_000_000;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Live backend that counts every call and answers with fixed data.
#[derive(Default)]
struct CountingBackend {
    calls: AtomicUsize,
}

impl CountingBackend {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit<T>(&self, value: T) -> Result<T, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }
}

fn live_product() -> Product {
    NewProduct {
        sku: "LIVE-SKU".to_string(),
        name: "Live Blend".to_string(),
        category: "Coffee".to_string(),
        price_cents: 999,
        stock: 1,
    }
    .into_product("LIVE-0001".to_string(), 0)
}

fn live_settings() -> SettingsRecord {
    let mut record = SettingsRecord::default();
    record.branding.company_name = "Live Co".to_string();
    record
}

#[async_trait]
impl ProductBackend for CountingBackend {
    async fn list_products(&self) -> Result<Vec<Product>, RemoteError> {
        self.hit(vec![live_product()])
    }

    async fn get_product(&self, _id: &str) -> Result<Product, RemoteError> {
        self.hit(live_product())
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product, RemoteError> {
        self.hit(product.clone().into_product("LIVE-0002".to_string(), 0))
    }

    async fn update_product(&self, _id: &str, patch: &ProductPatch) -> Result<Product, RemoteError> {
        let mut product = live_product();
        patch.apply(&mut product, 1);
        self.hit(product)
    }

    async fn delete_product(&self, _id: &str) -> Result<(), RemoteError> {
        self.hit(())
    }
}

#[async_trait]
impl SalesBackend for CountingBackend {
    async fn list_sales(&self) -> Result<Vec<Sale>, RemoteError> {
        self.hit(Vec::new())
    }

    async fn create_sale(&self, sale: &NewSale) -> Result<Sale, RemoteError> {
        self.hit(sale.clone().into_sale("LIVE-S-1".to_string(), 0))
    }

    async fn delete_sale(&self, _id: &str) -> Result<(), RemoteError> {
        self.hit(())
    }
}

#[async_trait]
impl SettingsBackend for CountingBackend {
    async fn load_settings(&self) -> Result<SettingsRecord, RemoteError> {
        self.hit(live_settings())
    }

    async fn update_settings(&self, _patch: &SettingsPatch) -> Result<SettingsRecord, RemoteError> {
        self.hit(live_settings())
    }

    async fn reset_settings(&self) -> Result<SettingsRecord, RemoteError> {
        self.hit(SettingsRecord::default())
    }
}

#[async_trait]
impl ArchiveBackend for CountingBackend {
    async fn list_archived(&self) -> Result<Vec<ArchivedItem>, RemoteError> {
        self.hit(Vec::new())
    }

    async fn archive_product(&self, request: &ArchiveRequest) -> Result<ArchivedItem, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RemoteError::NotFound {
            resource: format!("products/{}", request.product_id),
        })
    }

    async fn restore_archived(&self, _id: &str) -> Result<Product, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RemoteError::Rejected {
            status: 409,
            message: "already restored".to_string(),
        })
    }

    async fn purge_archived(&self, _id: &str) -> Result<(), RemoteError> {
        self.hit(())
    }
}

/// Probe whose answer the test flips.
struct SwitchProbe {
    answer: Mutex<Result<Mode, String>>,
}

#[async_trait]
impl ModeProbe for SwitchProbe {
    async fn probe(&self) -> Result<Mode, ProbeError> {
        self.answer.lock().clone().map_err(ProbeError::Unreachable)
    }
}

fn config() -> DataConfig {
    DataConfig {
        mode_env_var: None,
        ..DataConfig::default()
    }
}

fn layer_with(backend: Arc<CountingBackend>, store: Arc<dyn KeyValueStore>) -> DataLayer {
    DataLayer::builder(config())
        .backend(backend)
        .store(store)
        .clock(Arc::new(FixedClock::new(ANCHOR)))
        .build()
        .unwrap()
}

fn layer() -> (Arc<CountingBackend>, DataLayer) {
    let backend = Arc::new(CountingBackend::default());
    let layer = layer_with(backend.clone(), Arc::new(MemoryStore::new()));
    (backend, layer)
}

fn sale_of(product: &Product) -> NewSale {
    NewSale {
        lines: vec![SaleLine {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            category: product.category.clone(),
            quantity: 1,
            unit_price_cents: product.price_cents,
        }],
        payment_method: PaymentMethod::Cash,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mock_mode_never_contacts_backend() {
    let (backend, layer) = layer();
    layer.set_mode(Mode::Mock);

    let products = layer.products().list().await.unwrap();
    let first = &products[0];
    layer.products().get(&first.id).await.unwrap();
    let created = layer
        .products()
        .create(NewProduct {
            sku: "SKU-T".to_string(),
            name: "Tonic".to_string(),
            category: "Drinks".to_string(),
            price_cents: 300,
            stock: 4,
        })
        .await
        .unwrap();
    layer
        .products()
        .update(&created.id, &ProductPatch::default())
        .await
        .unwrap();
    layer.products().inventory_summary().await.unwrap();
    layer.products().low_stock(5).await.unwrap();

    let sale = layer.sales().create(sale_of(&created)).await.unwrap();
    layer.sales().list().await.unwrap();
    layer.sales().sales_by_hour().await.unwrap();
    layer.sales().sales_by_category().await.unwrap();
    layer.sales().summary().await.unwrap();
    layer.sales().delete(&sale.id).await.unwrap();

    layer.settings().get().await.unwrap();
    layer
        .settings()
        .update(&SettingsPatch::new().profile("name", "Ann"))
        .await
        .unwrap();
    layer.settings().reset().await.unwrap();

    let item = layer
        .archive()
        .archive(&ArchiveRequest {
            product_id: created.id.clone(),
            reason: None,
        })
        .await
        .unwrap();
    layer.archive().list().await.unwrap();
    layer.archive().restore(&item.id).await.unwrap();
    layer.products().delete(&created.id).await.unwrap();
    let archived = layer.archive().list().await.unwrap();
    layer.archive().purge(&archived[0].id).await.unwrap();

    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn live_mode_goes_to_backend_only() {
    let (backend, layer) = layer();
    layer.set_mode(Mode::Live);

    assert_eq!(layer.products().list().await.unwrap(), vec![live_product()]);
    assert_eq!(
        layer.settings().get().await.unwrap().branding.company_name,
        "Live Co"
    );
    let by_hour = layer.sales().sales_by_hour().await.unwrap();
    assert_eq!(by_hour.len(), 24);
    assert!(by_hour.iter().all(|h| h.sale_count == 0));

    assert_eq!(backend.calls(), 3);
    assert!(!layer.mock().is_initialized());
}

#[tokio::test]
async fn live_errors_keep_their_shape() {
    let (_backend, layer) = layer();
    layer.set_mode(Mode::Live);

    let err = layer
        .archive()
        .archive(&ArchiveRequest {
            product_id: "PRD-0001".to_string(),
            reason: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RemoteFailure);
    assert!(err.is_not_found());

    let err = layer.archive().restore("ARC-0001").await.unwrap_err();
    assert!(matches!(
        err,
        backoffice_service::DataError::Remote(RemoteError::Rejected { status: 409, .. })
    ));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn set_mode_is_visible_to_the_next_call() {
    let (backend, layer) = layer();

    layer.set_mode(Mode::Live);
    assert!(!layer.is_mock_mode().await);
    layer.products().list().await.unwrap();
    assert_eq!(backend.calls(), 1);

    layer.set_mode(Mode::Mock);
    assert!(layer.is_mock_mode().await);
    layer.products().list().await.unwrap();
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn mock_products_are_stable_within_a_session() {
    let (_backend, layer) = layer();
    let first = layer.products().list().await.unwrap();
    let second = layer.products().list().await.unwrap();
    assert_eq!(first.len(), config().mock.product_count);
    assert_eq!(first, second);
}

#[tokio::test]
async fn switching_back_to_mock_keeps_the_session() {
    let (_backend, layer) = layer();
    let before = layer.products().list().await.unwrap();

    layer.set_mode(Mode::Live);
    layer.products().list().await.unwrap();
    layer.set_mode(Mode::Mock);

    assert_eq!(layer.products().list().await.unwrap(), before);
}

#[tokio::test]
async fn settings_sections_merge_across_writes() {
    let (_backend, layer) = layer();
    layer
        .settings()
        .update(&SettingsPatch::new().branding("logoUrl", "x.png"))
        .await
        .unwrap();
    layer
        .settings()
        .update(&SettingsPatch::new().profile("name", "Ann"))
        .await
        .unwrap();

    let record = layer.settings().get().await.unwrap();
    let mut expected = SettingsRecord::default();
    expected.branding.logo_url = "x.png".to_string();
    expected.profile.name = "Ann".to_string();
    assert_eq!(record, expected);

    assert_eq!(
        layer.settings().reset().await.unwrap(),
        SettingsRecord::default()
    );
    assert_eq!(
        layer.settings().get().await.unwrap(),
        SettingsRecord::default()
    );
}

#[tokio::test]
async fn garbage_settings_heal_on_read() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    store.set(&config().settings_key(), "not json").unwrap();
    let layer = layer_with(Arc::new(CountingBackend::default()), store.clone());

    assert_eq!(
        layer.settings().get().await.unwrap(),
        SettingsRecord::default()
    );
    let healed = store.get(&config().settings_key()).unwrap().unwrap();
    assert!(SettingsRecord::from_stored(&healed).is_ok());
}

#[tokio::test]
async fn probe_drives_mode_until_overridden() {
    let probe = Arc::new(SwitchProbe {
        answer: Mutex::new(Ok(Mode::Live)),
    });
    let backend = Arc::new(CountingBackend::default());
    let layer = DataLayer::builder(DataConfig {
        probe_timeout: Duration::from_millis(200),
        ..config()
    })
    .backend(backend.clone())
    .probe(probe.clone())
    .clock(Arc::new(FixedClock::new(ANCHOR)))
    .build()
    .unwrap();

    layer.products().list().await.unwrap();
    assert_eq!(backend.calls(), 1);

    // Unreachable probe: keep the last known mode (live).
    *probe.answer.lock() = Err("flag service down".to_string());
    layer.products().list().await.unwrap();
    assert_eq!(backend.calls(), 2);

    layer.set_mode(Mode::Mock);
    *probe.answer.lock() = Ok(Mode::Live);
    layer.products().list().await.unwrap();
    assert_eq!(backend.calls(), 2);

    layer.mode().clear_override();
    layer.products().list().await.unwrap();
    assert_eq!(backend.calls(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_calls_during_toggles_never_split() {
    let (backend, layer) = layer();
    let layer = Arc::new(layer);
    let live_routed = Arc::new(AtomicUsize::new(0));

    let toggler = {
        let layer = Arc::clone(&layer);
        tokio::spawn(async move {
            for i in 0..200 {
                layer.set_mode(if i % 2 == 0 { Mode::Live } else { Mode::Mock });
                tokio::task::yield_now().await;
            }
        })
    };

    let mut workers = Vec::new();
    for _ in 0..4 {
        let layer = Arc::clone(&layer);
        let live_routed = Arc::clone(&live_routed);
        workers.push(tokio::spawn(async move {
            for _ in 0..100 {
                let products = layer.products().list().await.unwrap();
                // Live answers with exactly the one live product; mock never contains it.
                let live = products.iter().any(|p| p.id == "LIVE-0001");
                if live {
                    assert_eq!(products.len(), 1);
                    live_routed.fetch_add(1, Ordering::SeqCst);
                } else {
                    assert_eq!(products.len(), config().mock.product_count);
                }
            }
        }));
    }

    toggler.await.unwrap();
    for worker in workers {
        worker.await.unwrap();
    }
    assert_eq!(live_routed.load(Ordering::SeqCst), backend.calls());
}

#[tokio::test]
async fn concurrent_settings_writers_lose_nothing() {
    let (_backend, layer) = layer();
    let layer = Arc::new(layer);

    let mut tasks = Vec::new();
    for i in 0..16 {
        let layer = Arc::clone(&layer);
        tasks.push(tokio::spawn(async move {
            let patch = if i % 2 == 0 {
                SettingsPatch::new().branding(&format!("b{i}"), i)
            } else {
                SettingsPatch::new().profile(&format!("p{i}"), i)
            };
            layer.settings().update(&patch).await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let record = layer.settings().get().await.unwrap();
    for i in 0..16 {
        let value = if i % 2 == 0 {
            record.branding.extra.get(&format!("b{i}"))
        } else {
            record.profile.extra.get(&format!("p{i}"))
        };
        assert_eq!(value, Some(&serde_json::json!(i)));
    }
}
