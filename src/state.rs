//! Shared application state injected into request handlers.

use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::application::link_cache::{CacheSettings, LinkCache};
use crate::application::services::{LinkService, RedirectService};
use crate::config::Config;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::persistence::PgLinkRepository;

/// Tunables the services are built with.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Prefix of every derived `shortUrl`.
    pub base_url: String,
    pub cache: CacheSettings,
    /// Deadline for each store call.
    pub store_timeout: Duration,
}

impl ServiceSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            cache: CacheSettings {
                link_ttl: Duration::from_secs(config.link_cache_ttl_seconds),
                list_ttl: Duration::from_secs(config.list_cache_ttl_seconds),
                op_timeout: Duration::from_millis(config.cache_timeout_ms),
            },
            store_timeout: Duration::from_millis(config.store_timeout_ms),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            cache: CacheSettings::default(),
            store_timeout: Duration::from_secs(5),
        }
    }
}

/// Services shared by every handler.
///
/// Cloning is cheap; all members are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<PgLinkRepository>>,
    pub redirect_service: Arc<RedirectService<PgLinkRepository>>,
    pub base_url: Arc<str>,
}

impl AppState {
    /// Wires the services around one store pool and one cache client.
    pub fn new(pool: Arc<PgPool>, cache: Arc<dyn CacheService>, settings: ServiceSettings) -> Self {
        let repository = Arc::new(PgLinkRepository::new(pool));
        let link_cache = Arc::new(LinkCache::new(cache, settings.cache));

        let link_service = Arc::new(LinkService::new(
            repository.clone(),
            link_cache.clone(),
            settings.store_timeout,
        ));
        let redirect_service = Arc::new(RedirectService::new(
            repository,
            link_cache,
            settings.store_timeout,
        ));

        Self {
            link_service,
            redirect_service,
            base_url: Arc::from(settings.base_url),
        }
    }
}
