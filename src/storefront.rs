use crate::config::ServerConfig;
use crate::error::StorefrontResult;
use crate::permissions::Requester;
use crate::store::Store;
use crate::strategy::{Selector, Strategy};

/// The storefront service: entity store, configuration and strategy
/// selection, shared by every request handler.
pub struct Storefront {
    pub store: Store,
    pub config: ServerConfig,
    selector: Selector,
}

impl Storefront {
    /// Open the store at `config.storage_path`.
    ///
    /// The configuration is validated first; an empty secret is replaced with
    /// a generated one.
    pub fn new(mut config: ServerConfig) -> StorefrontResult<Self> {
        config.validate()?;
        config.ensure_secret_key();
        let store = Store::open(&config.storage_path)?;
        log::info!("Store opened at {}", config.storage_path.display());
        Ok(Self::with_store(config, store))
    }

    /// Use an already opened store.
    pub fn with_store(config: ServerConfig, store: Store) -> Self {
        let selector = Selector::new(&config.default_currency);
        Self {
            store,
            config,
            selector,
        }
    }

    pub fn strategy(&self, requester: Option<&Requester>) -> Box<dyn Strategy> {
        self.selector.strategy(requester)
    }
}
