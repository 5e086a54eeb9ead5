use std::sync::Arc;

use eoi_infra::{
    InMemoryStore, PostgresStore, ProductStore, RegistrationService, StoreError, UserStore,
};

use crate::config::AppConfig;

pub type DynProductStore = Arc<dyn ProductStore>;
pub type DynUserStore = Arc<dyn UserStore>;

/// Everything the handlers need: the stores and the registration service
/// built over them.
pub struct AppServices {
    registration: RegistrationService<DynProductStore, DynUserStore>,
}

impl AppServices {
    pub fn new(products: DynProductStore, users: DynUserStore) -> Self {
        Self {
            registration: RegistrationService::new(products, users),
        }
    }

    /// Both stores backed by one in-memory store.
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::new(store.clone(), store)
    }

    pub fn postgres(store: PostgresStore) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store)
    }

    pub fn products(&self) -> &DynProductStore {
        self.registration.products()
    }

    pub fn users(&self) -> &DynUserStore {
        self.registration.users()
    }

    pub fn registration(&self) -> &RegistrationService<DynProductStore, DynUserStore> {
        &self.registration
    }
}

/// Select stores per `USE_PERSISTENT_STORES`.
///
/// Persistent mode connects to Postgres and creates any missing tables
/// before the first request is served.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    if !config.use_persistent_stores {
        tracing::info!("using in-memory stores");
        return Ok(AppServices::in_memory());
    }

    let store = PostgresStore::connect(&config.database).await?;
    store.ensure_schema().await?;
    tracing::info!("using postgres stores");
    Ok(AppServices::postgres(store))
}
