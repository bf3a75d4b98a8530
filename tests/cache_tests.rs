//! Cache-aside behaviour of `CachedRepository` over the in-memory repository

use chrono::Duration;
use estate::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Transport that counts calls and can be switched off
#[derive(Default)]
struct FlakyTransport {
    inner: InMemoryCacheTransport,
    down: std::sync::atomic::AtomicBool,
    deletes: AtomicUsize,
}

impl FlakyTransport {
    fn check(&self) -> Result<(), CacheError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("connection reset".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheTransport for FlakyTransport {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn set(
        &self,
        key: &str,
        payload: Vec<u8>,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, CacheError> {
        self.check()?;
        self.inner.set(key, payload, expires_at).await
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.delete(key).await
    }
}

fn listing(name: &str, price: f64) -> Property {
    Property::new(name, "1 Main St", "Springfield", price, 2)
}

fn setup(
    items: Vec<Property>,
) -> (
    CachedRepository<Property, InMemoryRepository<Property>>,
    InMemoryRepository<Property>,
    Arc<FlakyTransport>,
) {
    let source = InMemoryRepository::with_entities(items);
    let transport = Arc::new(FlakyTransport::default());
    let cache = CacheService::new(transport.clone(), Duration::seconds(60));
    (CachedRepository::new(source.clone(), cache), source, transport)
}

#[tokio::test]
async fn test_list_after_create_reflects_new_entity() {
    let (repo, _, _) = setup(vec![listing("Parkview", 400000.0)]);
    assert_eq!(repo.list().await.unwrap().len(), 1);

    let created = repo.create(listing("Lakeside", 600000.0)).await.unwrap();

    let listed = repo.list().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().any(|p| p.id == created.id));
}

#[tokio::test]
async fn test_update_and_delete_invalidate() {
    let item = listing("Parkview", 400000.0);
    let (repo, _, transport) = setup(vec![item.clone()]);
    repo.list().await.unwrap();

    let mut changed = item.clone();
    changed.price = 450000.0;
    repo.update(&item.id, changed).await.unwrap();
    assert_eq!(repo.list().await.unwrap()[0].price, 450000.0);

    repo.delete(&item.id).await.unwrap();
    assert!(repo.list().await.unwrap().is_empty());
    assert_eq!(transport.deletes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_filtered_query_against_snapshot() {
    let (repo, _, _) = setup(vec![
        listing("Parkview", 400000.0),
        listing("Lakeside", 600000.0),
        listing("Parkside", 900000.0),
    ]);
    repo.list().await.unwrap();

    let request = QueryFilterRequest::new()
        .filter("Price", ComparisonOperator::GreaterThan, "500000")
        .sort_by("Price", SortDirection::Descending, 0)
        .page(0, 1);
    let page = repo
        .find_page(Specification::from_request(&request).build())
        .await
        .unwrap();

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].name, "Parkside");
    assert_eq!(page.pagination.total, 2);
}

#[tokio::test]
async fn test_cache_outage_does_not_block_requests() {
    let (repo, source, transport) = setup(vec![listing("Parkview", 400000.0)]);
    transport.down.store(true, Ordering::SeqCst);

    assert_eq!(repo.list().await.unwrap().len(), 1);

    let created = repo.create(listing("Lakeside", 600000.0)).await.unwrap();
    assert!(source.get(&created.id).await.unwrap().is_some());
    assert_eq!(transport.deletes.load(Ordering::SeqCst), 1);

    let found = repo
        .find(Specification::<Property>::builder().build())
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn test_stale_snapshot_after_outage_recovery() {
    let (repo, _, transport) = setup(vec![listing("Parkview", 400000.0)]);
    repo.list().await.unwrap();

    // Invalidation fails while the cache is down, so the old snapshot survives
    transport.down.store(true, Ordering::SeqCst);
    repo.create(listing("Lakeside", 600000.0)).await.unwrap();
    transport.down.store(false, Ordering::SeqCst);

    assert_eq!(repo.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_disabled_cache_always_reads_source() {
    let source = InMemoryRepository::with_entities(vec![listing("Parkview", 400000.0)]);
    let transport = InMemoryCacheTransport::new();
    let config = CacheConfig {
        enabled: false,
        ttl_seconds: 60,
    };
    let repo = CachedRepository::<Property, _>::new(
        source.clone(),
        CacheService::from_config(Arc::new(transport.clone()), &config),
    );

    repo.list().await.unwrap();
    source.create(listing("Lakeside", 600000.0)).await.unwrap();

    assert_eq!(repo.list().await.unwrap().len(), 2);
    assert!(transport.is_empty());
}
