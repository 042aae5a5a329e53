//! Cache-aside behavior of the provider service against in-memory fakes.

use gantry_config::CacheConfig;
use gantry_core::{GantryError, PageWindow, Provider, ProviderId};
use gantry_repository::{InMemoryProviderRepository, ProviderRepository};
use gantry_service::cache_keys;
use gantry_service::{
    BackgroundTasks, CacheBackend, CreateProviderRequest, InMemoryCacheBackend, ProviderCache, ProviderCacheImpl,
    ProviderService, ProviderServiceImpl, RedisCacheBackend, UpdateProviderRequest,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

struct Harness {
    repository: Arc<InMemoryProviderRepository>,
    backend: Arc<InMemoryCacheBackend>,
    cache: Arc<ProviderCacheImpl>,
    service: ProviderServiceImpl,
}

impl Harness {
    fn new() -> Self {
        Self::with_repository(InMemoryProviderRepository::new())
    }

    fn seeded(names: &[&str]) -> (Self, Vec<Provider>) {
        let providers: Vec<Provider> = names
            .iter()
            .map(|name| Provider::new(*name, format!("{} Inc.", name)))
            .collect();
        let harness = Self::with_repository(InMemoryProviderRepository::with_providers(providers.clone()));
        (harness, providers)
    }

    fn with_repository(repository: InMemoryProviderRepository) -> Self {
        let repository = Arc::new(repository);
        let backend = Arc::new(InMemoryCacheBackend::new());
        let cache = Arc::new(ProviderCacheImpl::new(backend.clone(), &CacheConfig::default()));
        let service = ProviderServiceImpl::new(repository.clone(), cache.clone(), BackgroundTasks::new());
        Self {
            repository,
            backend,
            cache,
            service,
        }
    }

    async fn settle(&self) {
        self.service.tasks().wait_idle().await;
    }

    async fn create(&self, short_name: &str, long_name: &str) -> Provider {
        let provider = self.service.create_provider(create(short_name, long_name)).await.unwrap();
        self.settle().await;
        provider
    }

    fn paged_keys(&self) -> Vec<String> {
        self.backend
            .keys()
            .into_iter()
            .filter(|key| key.starts_with(&cache_keys::provider_pages_prefix()))
            .collect()
    }
}

fn create(short_name: &str, long_name: &str) -> CreateProviderRequest {
    CreateProviderRequest {
        short_name: short_name.to_string(),
        long_name: long_name.to_string(),
    }
}

fn update(short_name: &str, long_name: &str) -> UpdateProviderRequest {
    UpdateProviderRequest {
        short_name: short_name.to_string(),
        long_name: long_name.to_string(),
    }
}

fn short_names(providers: &[Provider]) -> Vec<&str> {
    providers.iter().map(|p| p.short_name.as_str()).collect()
}

#[tokio::test]
async fn test_create_persists_and_populates_cache() {
    let h = Harness::new();

    let provider = h.create("aws", "Amazon").await;

    assert_eq!(h.repository.find_by_id(provider.id).await.unwrap(), Some(provider.clone()));
    assert_eq!(h.cache.get_by_id(provider.id).await.unwrap(), Some(provider.clone()));
    assert_eq!(h.cache.get_by_short_name("aws").await.unwrap(), Some(provider));
}

#[tokio::test]
async fn test_create_invalidates_paged_listings() {
    let (h, _) = Harness::seeded(&["a", "b"]);
    h.service.list_providers(0, 2).await.unwrap();
    h.settle().await;
    assert_eq!(h.paged_keys().len(), 1);

    h.create("c", "C").await;

    assert!(h.paged_keys().is_empty());
}

#[tokio::test]
async fn test_create_with_taken_short_name_conflicts_without_store_write() {
    let h = Harness::new();
    h.create("aws", "Amazon").await;
    assert_eq!(h.repository.write_count(), 1);

    let err = h.service.create_provider(create("aws", "Other")).await.unwrap_err();

    assert!(matches!(err, GantryError::Conflict(ref msg) if msg == "Provider with 'aws' short name already exists"));
    assert_eq!(h.repository.write_count(), 1);
    assert_eq!(h.repository.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_short_names_are_case_sensitive() {
    let h = Harness::new();
    h.create("aws", "Amazon").await;
    h.create("AWS", "Amazon upper").await;
    assert_eq!(h.repository.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_get_reads_through_and_refills_cache() {
    let (h, providers) = Harness::seeded(&["aws"]);
    let id = providers[0].id;
    assert!(!h.backend.contains(&cache_keys::provider_by_id(id)));

    assert_eq!(h.service.get_provider(id).await.unwrap(), providers[0]);
    h.settle().await;

    assert!(h.backend.contains(&cache_keys::provider_by_id(id)));
    assert!(h.backend.contains(&cache_keys::provider_by_short_name("aws")));
}

#[tokio::test]
async fn test_get_is_served_from_cache_after_population() {
    let h = Harness::new();
    let provider = h.create("aws", "Amazon").await;

    h.repository.set_failing(true);

    assert_eq!(h.service.get_provider(provider.id).await.unwrap(), provider);
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let h = Harness::new();
    let err = h.service.get_provider(ProviderId::new()).await.unwrap_err();
    assert!(matches!(err, GantryError::NotFound { resource_type: "Provider", .. }));
}

#[tokio::test]
async fn test_reads_always_match_the_store() {
    let h = Harness::new();

    async fn assert_matches_store(h: &Harness, id: ProviderId) {
        h.settle().await;
        let from_store = h.repository.find_by_id(id).await.unwrap();
        match h.service.get_provider(id).await {
            Ok(provider) => assert_eq!(Some(provider), from_store),
            Err(e) => {
                assert!(e.is_not_found());
                assert_eq!(from_store, None);
            }
        }
        h.settle().await;
    }

    let a = h.create("a", "Alpha").await;
    let b = h.create("b", "Beta").await;
    assert_matches_store(&h, a.id).await;
    assert_matches_store(&h, b.id).await;

    h.service.update_provider(a.id, update("", "Alpha Two")).await.unwrap();
    assert_matches_store(&h, a.id).await;

    h.service.update_provider(a.id, update("c", "")).await.unwrap();
    assert_matches_store(&h, a.id).await;

    h.service.delete_provider(b.id).await.unwrap();
    assert_matches_store(&h, b.id).await;

    h.service.update_provider(a.id, update("b", "Reused")).await.unwrap();
    assert_matches_store(&h, a.id).await;
    assert_matches_store(&h, b.id).await;
}

#[tokio::test]
async fn test_short_name_pointer_without_primary_falls_back_to_store() {
    let h = Harness::new();
    let provider = h.create("aws", "Amazon").await;

    h.backend.evict(&cache_keys::provider_by_id(provider.id));
    assert_eq!(h.cache.get_by_short_name("aws").await.unwrap(), None);

    let err = h.service.create_provider(create("aws", "Again")).await.unwrap_err();
    assert!(matches!(err, GantryError::Conflict(_)));
    assert_eq!(h.repository.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_short_cached_page_is_not_trusted() {
    let (h, providers) = Harness::seeded(&["a", "b", "c", "d", "e"]);
    let window = PageWindow::new(0, 3);
    h.cache.set_paged(window, &providers[..2]).await.unwrap();

    h.repository.set_failing(true);
    assert!(h.service.list_providers(0, 3).await.is_err());

    h.repository.set_failing(false);
    let page = h.service.list_providers(0, 3).await.unwrap();
    assert_eq!(short_names(&page), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_filled_cached_page_is_served_without_store() {
    let (h, providers) = Harness::seeded(&["a", "b", "c"]);
    h.cache.set_paged(PageWindow::new(0, 2), &providers[..2]).await.unwrap();

    h.repository.set_failing(true);

    let page = h.service.list_providers(0, 2).await.unwrap();
    assert_eq!(short_names(&page), vec!["a", "b"]);
}

#[tokio::test]
async fn test_list_normalizes_window() {
    let (h, _) = Harness::seeded(&["a", "b"]);

    let page = h.service.list_providers(-1, 0).await.unwrap();
    assert_eq!(short_names(&page), vec!["a"]);
    h.settle().await;

    assert!(h.backend.contains(&cache_keys::provider_page(PageWindow::new(0, 1))));
}

#[tokio::test]
async fn test_list_past_the_end_is_empty() {
    let (h, _) = Harness::seeded(&["a"]);
    assert!(h.service.list_providers(10, 5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_listing_reflects_update_and_delete() {
    let (h, providers) = Harness::seeded(&["a", "b", "c"]);
    h.service.list_providers(0, 3).await.unwrap();
    h.service.list_providers(1, 2).await.unwrap();
    h.settle().await;
    assert_eq!(h.paged_keys().len(), 2);

    h.service
        .update_provider(providers[1].id, update("", "Bee"))
        .await
        .unwrap();
    h.settle().await;

    let page = h.service.list_providers(0, 3).await.unwrap();
    assert_eq!(page[1].long_name, "Bee");
    let page = h.service.list_providers(1, 2).await.unwrap();
    assert_eq!(page[0].long_name, "Bee");
    h.settle().await;

    h.service.delete_provider(providers[0].id).await.unwrap();
    h.settle().await;

    let page = h.service.list_providers(0, 3).await.unwrap();
    assert_eq!(short_names(&page), vec!["b", "c"]);
    let page = h.service.list_providers(1, 2).await.unwrap();
    assert_eq!(short_names(&page), vec!["c"]);
}

#[tokio::test]
async fn test_update_with_empty_short_name_changes_only_long_name() {
    let h = Harness::new();
    let provider = h.create("aws", "Amazon").await;

    let updated = h
        .service
        .update_provider(provider.id, update("", "Amazon Web Services"))
        .await
        .unwrap();

    assert_eq!(updated.id, provider.id);
    assert_eq!(updated.short_name, "aws");
    assert_eq!(updated.long_name, "Amazon Web Services");
    assert_eq!(updated.created_at, provider.created_at);

    h.settle().await;
    assert_eq!(h.service.get_provider(provider.id).await.unwrap(), updated);
}

#[tokio::test]
async fn test_update_to_taken_short_name_conflicts() {
    let h = Harness::new();
    h.create("aws", "Amazon").await;
    let gcp = h.create("gcp", "Google").await;

    let err = h.service.update_provider(gcp.id, update("aws", "")).await.unwrap_err();

    assert!(matches!(err, GantryError::Conflict(_)));
    assert_eq!(h.repository.write_count(), 2);
}

#[tokio::test]
async fn test_update_conflict_lookup_refills_only_the_other_provider() {
    let (h, providers) = Harness::seeded(&["aws", "gcp"]);
    let (aws, gcp) = (&providers[0], &providers[1]);

    let err = h.service.update_provider(gcp.id, update("aws", "")).await.unwrap_err();
    assert!(matches!(err, GantryError::Conflict(_)));
    h.settle().await;

    assert!(h.backend.contains(&cache_keys::provider_by_id(aws.id)));
    assert!(h.backend.contains(&cache_keys::provider_by_short_name("aws")));
    assert!(!h.backend.contains(&cache_keys::provider_by_id(gcp.id)));
    assert!(!h.backend.contains(&cache_keys::provider_by_short_name("gcp")));
}

#[tokio::test]
async fn test_update_keeping_own_short_name_is_allowed() {
    let h = Harness::new();
    let aws = h.create("aws", "Amazon").await;

    let updated = h.service.update_provider(aws.id, update("aws", "Amazon")).await.unwrap();
    assert_eq!(updated.short_name, "aws");
}

#[tokio::test]
async fn test_update_with_blank_long_name_is_rejected() {
    let h = Harness::new();
    let aws = h.create("aws", "Amazon").await;

    let err = h.service.update_provider(aws.id, update("", "  ")).await.unwrap_err();

    assert!(matches!(err, GantryError::Validation(_)));
    assert_eq!(h.repository.write_count(), 1);
    assert_eq!(h.service.get_provider(aws.id).await.unwrap().long_name, "Amazon");
}

#[tokio::test]
async fn test_update_missing_is_not_found() {
    let h = Harness::new();
    let err = h
        .service
        .update_provider(ProviderId::new(), update("", "x"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_rename_releases_old_short_name() {
    let h = Harness::new();
    let provider = h.create("aws", "Amazon").await;

    h.service.update_provider(provider.id, update("amzn", "")).await.unwrap();
    h.settle().await;

    assert!(!h.backend.contains(&cache_keys::provider_by_short_name("aws")));
    assert!(h.backend.contains(&cache_keys::provider_by_short_name("amzn")));

    let reused = h.create("aws", "Another").await;
    assert_ne!(reused.id, provider.id);
}

#[tokio::test]
async fn test_delete_removes_entity_and_cache_entries() {
    let h = Harness::new();
    let provider = h.create("aws", "Amazon").await;
    h.service.list_providers(0, 1).await.unwrap();
    h.settle().await;

    h.service.delete_provider(provider.id).await.unwrap();
    h.settle().await;

    assert!(h.backend.keys().is_empty());
    assert!(h.service.get_provider(provider.id).await.unwrap_err().is_not_found());
    assert!(h.service.delete_provider(provider.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_operations_succeed_with_failing_cache() {
    let h = Harness::new();
    h.backend.set_fail_all(true);

    let aws = h.service.create_provider(create("aws", "Amazon")).await.unwrap();
    let err = h.service.create_provider(create("aws", "Again")).await.unwrap_err();
    assert!(matches!(err, GantryError::Conflict(_)));

    assert_eq!(h.service.get_provider(aws.id).await.unwrap(), aws);
    assert_eq!(h.service.list_providers(0, 10).await.unwrap(), vec![aws.clone()]);

    let updated = h.service.update_provider(aws.id, update("", "AWS")).await.unwrap();
    assert_eq!(updated.long_name, "AWS");

    h.service.delete_provider(aws.id).await.unwrap();
    assert!(h.service.get_provider(aws.id).await.unwrap_err().is_not_found());

    h.settle().await;
    assert!(h.backend.keys().is_empty());
}

#[tokio::test]
async fn test_failing_cache_matches_disabled_cache() {
    let failing = Harness::new();
    failing.backend.set_fail_all(true);

    let repository = Arc::new(InMemoryProviderRepository::new());
    let disabled: Arc<dyn CacheBackend> = Arc::new(RedisCacheBackend::disabled());
    let cache = Arc::new(ProviderCacheImpl::new(disabled, &CacheConfig::default()));
    let plain = ProviderServiceImpl::new(repository, cache, BackgroundTasks::new());

    for service in [&failing.service, &plain] {
        let a = service.create_provider(create("a", "A")).await.unwrap();
        assert!(service.create_provider(create("a", "A")).await.is_err());
        assert_eq!(service.get_provider(a.id).await.unwrap().short_name, "a");
        assert_eq!(service.list_providers(0, 5).await.unwrap().len(), 1);
        assert_eq!(service.update_provider(a.id, update("b", "")).await.unwrap().short_name, "b");
        service.delete_provider(a.id).await.unwrap();
        assert!(service.delete_provider(a.id).await.unwrap_err().is_not_found());
        service.tasks().wait_idle().await;
    }
}

#[tokio::test]
async fn test_slow_cache_writes_do_not_delay_callers() {
    let h = Harness::new();
    h.backend.set_write_latency(Some(Duration::from_millis(500)));

    let started = Instant::now();
    let provider = h.service.create_provider(create("aws", "Amazon")).await.unwrap();
    h.service.update_provider(provider.id, update("", "AWS")).await.unwrap();
    h.service.list_providers(0, 10).await.unwrap();
    h.service.delete_provider(provider.id).await.unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_millis(250), "service calls took {:?}", elapsed);
    assert!(h.service.tasks().in_flight() > 0);

    h.settle().await;
    assert_eq!(h.service.tasks().in_flight(), 0);
}

/// The short-name check and the insert are two separate steps with no lock
/// between them. Two concurrent creates can both pass the check; only the
/// store's unique key keeps the second one out.
#[tokio::test]
async fn test_concurrent_creates_race_past_the_check_and_store_rejects_one() {
    let h = Harness::new();
    h.repository.set_latency(Some(Duration::from_millis(50)));

    let (first, second) = tokio::join!(
        h.service.create_provider(create("aws", "First")),
        h.service.create_provider(create("aws", "Second")),
    );

    let results = [first, second];
    let created = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(GantryError::Conflict(_))))
        .count();
    assert_eq!((created, conflicts), (1, 1));

    h.repository.set_latency(None);
    assert_eq!(h.repository.count().await.unwrap(), 1);
    assert_eq!(h.repository.write_count(), 1);
}

/// A server that accepts connections and never replies.
async fn unresponsive_redis() -> gantry_config::RedisConfig {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    gantry_config::RedisConfig {
        url: format!("redis://{}", addr),
        timeout_ms: 100,
        ..gantry_config::RedisConfig::default()
    }
}

#[tokio::test]
async fn test_hung_cache_backend_costs_one_store_round_trip() {
    let provider = Provider::new("aws", "Amazon");
    let repository = Arc::new(InMemoryProviderRepository::with_providers(vec![provider.clone()]));
    let backend: Arc<dyn CacheBackend> = Arc::new(RedisCacheBackend::connect(&unresponsive_redis().await).unwrap());
    let cache = Arc::new(ProviderCacheImpl::new(backend, &CacheConfig::default()));
    let service = ProviderServiceImpl::new(repository, cache, BackgroundTasks::new());

    let results = tokio::time::timeout(Duration::from_secs(5), async {
        let found = service.get_provider(provider.id).await;
        let page = service.list_providers(0, 10).await;
        let duplicate = service.create_provider(create("aws", "Again")).await;
        let renamed = service.update_provider(provider.id, update("amzn", "")).await;
        (found, page, duplicate, renamed)
    })
    .await
    .expect("service calls must not wait on an unresponsive cache");

    assert_eq!(results.0.unwrap(), provider);
    assert_eq!(results.1.unwrap(), vec![provider.clone()]);
    assert!(matches!(results.2.unwrap_err(), GantryError::Conflict(_)));
    assert_eq!(results.3.unwrap().short_name, "amzn");

    assert!(service.tasks().drain(Duration::from_secs(5)).await);
}
