//! Builder assembling the standard four-runtime bridge.

use argot_event::EventBus;
use argot_js::JsRuntime;
use argot_lisp::LispRuntime;
use argot_lua::LuaRuntime;
use argot_rhai::RhaiRuntime;
use argot_runtime::{
    BridgeServices, ConfigStore, HttpClient, IrcSession, KvStore, MemoryConfig, MemoryKv,
    RuntimeError, ScriptManager, UreqClient,
};
use argot_store::{DocumentStore, MemoryStore, StoreAdapter};
use std::sync::Arc;
use tracing::debug;

/// Builds a [`ScriptManager`] with all four embedded runtimes.
///
/// Only the IRC session is required; every other collaborator has an
/// in-process default.
pub struct BridgeBuilder {
    irc: Arc<dyn IrcSession>,
    store: Option<Arc<dyn DocumentStore>>,
    http: Option<Arc<dyn HttpClient>>,
    config: Option<Arc<dyn ConfigStore>>,
    data: Option<Arc<dyn KvStore>>,
}

impl BridgeBuilder {
    /// Starts a builder around the host's IRC session.
    #[must_use]
    pub fn new(irc: Arc<dyn IrcSession>) -> Self {
        Self {
            irc,
            store: None,
            http: None,
            config: None,
            data: None,
        }
    }

    /// Uses a custom document store (default: [`MemoryStore`]).
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Uses a custom HTTP client (default: [`UreqClient`]).
    #[must_use]
    pub fn with_http(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Uses a custom config accessor (default: [`MemoryConfig`]).
    #[must_use]
    pub fn with_config(mut self, config: Arc<dyn ConfigStore>) -> Self {
        self.config = Some(config);
        self
    }

    /// Uses a custom key/value store (default: [`MemoryKv`]).
    #[must_use]
    pub fn with_data(mut self, data: Arc<dyn KvStore>) -> Self {
        self.data = Some(data);
        self
    }

    /// Assembles the services and registers the Lua, JavaScript, Rhai,
    /// and Lisp runtimes.
    ///
    /// # Errors
    ///
    /// Returns the first runtime's [`RuntimeError::Init`] if an
    /// interpreter fails to set up.
    pub fn build(self) -> Result<ScriptManager, RuntimeError> {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn DocumentStore>);
        let services = BridgeServices {
            bus: Arc::new(EventBus::new()),
            store: Arc::new(StoreAdapter::new(store)),
            data: self
                .data
                .unwrap_or_else(|| Arc::new(MemoryKv::new()) as Arc<dyn KvStore>),
            irc: self.irc,
            http: self
                .http
                .unwrap_or_else(|| Arc::new(UreqClient::new()) as Arc<dyn HttpClient>),
            config: self
                .config
                .unwrap_or_else(|| Arc::new(MemoryConfig::new()) as Arc<dyn ConfigStore>),
        };

        let mut manager = ScriptManager::new(services.clone());
        manager.register(Box::new(LuaRuntime::new(services.clone())?));
        manager.register(Box::new(JsRuntime::new(services.clone())?));
        manager.register(Box::new(RhaiRuntime::new(services.clone())?));
        manager.register(Box::new(LispRuntime::new(services)?));
        debug!("bridge assembled with {} runtimes", manager.languages().len());
        Ok(manager)
    }
}
