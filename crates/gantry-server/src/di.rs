//! Dependency wiring.
//!
//! [`AppModule`] owns the component graph of one server process:
//!
//! ```text
//! ProviderServiceImpl ── ProviderRepository (MySQL or supplied)
//!        │            └─ ProviderCacheImpl ── CacheBackend (Redis or supplied)
//!        └─ BackgroundTasks
//! PokemonServiceImpl ── PokeApiClient (HTTP or supplied)
//! ```

use gantry_client::{HttpPokeApiClient, PokeApiClient};
use gantry_config::{CacheConfig, PokeApiConfig};
use gantry_core::{GantryError, GantryResult};
use gantry_repository::{DatabasePoolInterface, MySqlProviderRepository, ProviderRepository};
use gantry_service::{
    BackgroundTasks, CacheBackend, PokemonService, PokemonServiceImpl, ProviderCache, ProviderCacheImpl,
    ProviderService, ProviderServiceImpl, RedisCacheBackend,
};
use std::sync::Arc;
use tracing::debug;

/// Resolved components of a running server.
pub struct AppModule {
    database_pool: Option<Arc<dyn DatabasePoolInterface>>,
    provider_repository: Arc<dyn ProviderRepository>,
    provider_cache: Arc<dyn ProviderCache>,
    provider_service: Arc<dyn ProviderService>,
    pokemon_service: Arc<dyn PokemonService>,
    tasks: BackgroundTasks,
}

impl AppModule {
    /// Starts a new builder.
    #[must_use]
    pub fn builder() -> AppModuleBuilder {
        AppModuleBuilder::new()
    }

    /// Database pool, when the module was built over MySQL.
    pub fn database_pool(&self) -> Option<Arc<dyn DatabasePoolInterface>> {
        self.database_pool.clone()
    }

    pub fn provider_repository(&self) -> Arc<dyn ProviderRepository> {
        self.provider_repository.clone()
    }

    pub fn provider_cache(&self) -> Arc<dyn ProviderCache> {
        self.provider_cache.clone()
    }

    pub fn provider_service(&self) -> Arc<dyn ProviderService> {
        self.provider_service.clone()
    }

    pub fn pokemon_service(&self) -> Arc<dyn PokemonService> {
        self.pokemon_service.clone()
    }

    /// Tracker of detached cache work, drained on shutdown.
    pub fn tasks(&self) -> &BackgroundTasks {
        &self.tasks
    }
}

/// Builder for [`AppModule`].
///
/// A repository is required, either supplied directly or derived from a
/// database pool. The cache backend defaults to a disabled Redis backend and
/// the Pokemon client to an HTTP client over `pokeapi_config`.
#[derive(Default)]
pub struct AppModuleBuilder {
    database_pool: Option<Arc<dyn DatabasePoolInterface>>,
    provider_repository: Option<Arc<dyn ProviderRepository>>,
    cache_backend: Option<Arc<dyn CacheBackend>>,
    cache_config: CacheConfig,
    pokeapi_client: Option<Arc<dyn PokeApiClient>>,
    pokeapi_config: PokeApiConfig,
}

impl AppModuleBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the MySQL repository over this pool.
    #[must_use]
    pub fn with_database_pool(mut self, pool: Arc<dyn DatabasePoolInterface>) -> Self {
        self.database_pool = Some(pool);
        self
    }

    /// Uses this repository instead of one derived from the pool.
    #[must_use]
    pub fn with_provider_repository(mut self, repository: Arc<dyn ProviderRepository>) -> Self {
        self.provider_repository = Some(repository);
        self
    }

    #[must_use]
    pub fn with_cache_backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.cache_backend = Some(backend);
        self
    }

    #[must_use]
    pub fn with_cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    #[must_use]
    pub fn with_pokeapi_client(mut self, client: Arc<dyn PokeApiClient>) -> Self {
        self.pokeapi_client = Some(client);
        self
    }

    #[must_use]
    pub fn with_pokeapi_config(mut self, config: PokeApiConfig) -> Self {
        self.pokeapi_config = config;
        self
    }

    /// Builds the module.
    pub fn build(self) -> GantryResult<AppModule> {
        let provider_repository: Arc<dyn ProviderRepository> = match (self.provider_repository, &self.database_pool) {
            (Some(repository), _) => repository,
            (None, Some(pool)) => Arc::new(MySqlProviderRepository::new(pool.clone())),
            (None, None) => {
                return Err(GantryError::Configuration(
                    "A database pool or provider repository is required".to_string(),
                ))
            }
        };

        let cache_backend = self
            .cache_backend
            .unwrap_or_else(|| Arc::new(RedisCacheBackend::disabled()));
        debug!(cache_enabled = cache_backend.is_enabled(), "Wiring provider cache");
        let provider_cache: Arc<dyn ProviderCache> = Arc::new(ProviderCacheImpl::new(cache_backend, &self.cache_config));

        let tasks = BackgroundTasks::new();
        let provider_service: Arc<dyn ProviderService> = Arc::new(ProviderServiceImpl::new(
            provider_repository.clone(),
            provider_cache.clone(),
            tasks.clone(),
        ));

        let pokeapi_client: Arc<dyn PokeApiClient> = match self.pokeapi_client {
            Some(client) => client,
            None => Arc::new(HttpPokeApiClient::new(&self.pokeapi_config)?),
        };
        let pokemon_service: Arc<dyn PokemonService> = Arc::new(PokemonServiceImpl::new(pokeapi_client));

        Ok(AppModule {
            database_pool: self.database_pool,
            provider_repository,
            provider_cache,
            provider_service,
            pokemon_service,
            tasks,
        })
    }
}
