//! Shared collaborator bundle.

use argot_event::EventBus;
use argot_store::StoreAdapter;
use std::sync::Arc;

use crate::{ConfigStore, HttpClient, IrcSession, KvStore};

/// Everything a registrar captures when wiring its interpreter.
///
/// One `BridgeServices` is cloned into every registrar; all fields are
/// shared handles, so every language observes the same bindings, the same
/// collections, and the same key/value data.
#[derive(Clone)]
pub struct BridgeServices {
    /// Event subscription registry and trigger queue.
    pub bus: Arc<EventBus>,
    /// Document store front-end.
    pub store: Arc<StoreAdapter>,
    /// Cross-language key/value data (`data.Get`/`data.Set`).
    pub data: Arc<dyn KvStore>,
    /// The host's IRC connection.
    pub irc: Arc<dyn IrcSession>,
    /// Blocking HTTP helper.
    pub http: Arc<dyn HttpClient>,
    /// Config accessor.
    pub config: Arc<dyn ConfigStore>,
}
