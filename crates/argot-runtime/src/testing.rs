//! Test doubles for the bridge's collaborators.
//!
//! Shipped as a regular module so registrar crates and integration tests
//! can share one set of doubles instead of growing their own.

use argot_event::EventBus;
use argot_store::{MemoryStore, StoreAdapter};
use argot_types::{EventType, Language, ScriptMap};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    BridgeServices, HttpClient, HttpError, IrcSession, MemoryConfig, MemoryKv, RuntimeError,
    ScriptRuntime,
};

/// One recorded IRC action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrcCall {
    /// `join(channel)`.
    Join(String),
    /// `part(channel)`.
    Part(String),
    /// `privmsg(target, message)`.
    Privmsg(String, String),
    /// `nick(new_nick)`.
    Nick(String),
}

/// [`IrcSession`] double that records every action.
pub struct RecordingIrc {
    nick: Mutex<String>,
    calls: Mutex<Vec<IrcCall>>,
}

impl RecordingIrc {
    /// Creates a session whose nick is `"argot"`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_nick("argot")
    }

    /// Creates a session with the given nick.
    #[must_use]
    pub fn with_nick(nick: &str) -> Self {
        Self {
            nick: Mutex::new(nick.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of the recorded actions.
    #[must_use]
    pub fn calls(&self) -> Vec<IrcCall> {
        self.calls.lock().clone()
    }
}

impl Default for RecordingIrc {
    fn default() -> Self {
        Self::new()
    }
}

impl IrcSession for RecordingIrc {
    fn join(&self, channel: &str) {
        self.calls.lock().push(IrcCall::Join(channel.to_string()));
    }

    fn part(&self, channel: &str) {
        self.calls.lock().push(IrcCall::Part(channel.to_string()));
    }

    fn privmsg(&self, target: &str, message: &str) {
        self.calls
            .lock()
            .push(IrcCall::Privmsg(target.to_string(), message.to_string()));
    }

    fn current_nick(&self) -> String {
        self.nick.lock().clone()
    }

    fn nick(&self, new_nick: &str) {
        self.calls.lock().push(IrcCall::Nick(new_nick.to_string()));
        *self.nick.lock() = new_nick.to_string();
    }
}

/// [`HttpClient`] double serving canned bodies by URL.
///
/// Unknown URLs answer 404.
#[derive(Default)]
pub struct StaticHttp {
    responses: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<String>>,
}

impl StaticHttp {
    /// Creates an empty double.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a canned body for a URL.
    pub fn insert(&self, url: &str, body: &str) {
        self.responses
            .lock()
            .insert(url.to_string(), body.to_string());
    }

    /// Returns every URL requested so far.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

impl HttpClient for StaticHttp {
    fn get(&self, url: &str) -> Result<String, HttpError> {
        self.requests.lock().push(url.to_string());
        self.responses
            .lock()
            .get(url)
            .cloned()
            .ok_or_else(|| HttpError::Status {
                status: 404,
                url: url.to_string(),
            })
    }
}

/// All collaborators wired with in-memory doubles.
pub struct TestBridge {
    /// The bundle to hand to runtimes and managers.
    pub services: BridgeServices,
    /// The IRC double, for assertions.
    pub irc: Arc<RecordingIrc>,
    /// The HTTP double, for canned responses and assertions.
    pub http: Arc<StaticHttp>,
}

/// Builds a [`TestBridge`] with fresh in-memory state.
#[must_use]
pub fn bridge() -> TestBridge {
    let irc = Arc::new(RecordingIrc::new());
    let http = Arc::new(StaticHttp::new());
    let services = BridgeServices {
        bus: Arc::new(EventBus::new()),
        store: Arc::new(StoreAdapter::new(Arc::new(MemoryStore::new()))),
        data: Arc::new(MemoryKv::new()),
        irc: Arc::clone(&irc) as Arc<dyn IrcSession>,
        http: Arc::clone(&http) as Arc<dyn HttpClient>,
        config: Arc::new(MemoryConfig::new()),
    };
    TestBridge {
        services,
        irc,
        http,
    }
}

type DispatchLog = Arc<Mutex<Vec<(String, ScriptMap)>>>;

/// Scriptable [`ScriptRuntime`] double.
///
/// Records every dispatch; can be configured to fail on one handler name
/// or to enqueue a follow-up event the first time a handler runs (for
/// nested-trigger tests).
pub struct FakeRuntime {
    language: Language,
    bus: Arc<EventBus>,
    calls: DispatchLog,
    fail_on: Option<String>,
    trigger_once: Option<(String, EventType)>,
}

impl FakeRuntime {
    /// Creates a double for `language` sharing the bridge's bus.
    #[must_use]
    pub fn new(language: Language, services: &BridgeServices) -> Self {
        Self {
            language,
            bus: Arc::clone(&services.bus),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_on: None,
            trigger_once: None,
        }
    }

    /// Returns the shared dispatch log.
    #[must_use]
    pub fn calls(&self) -> DispatchLog {
        Arc::clone(&self.calls)
    }

    /// Makes dispatch of `handler` fail (after recording the call).
    #[must_use]
    pub fn failing_on(mut self, handler: &str) -> Self {
        self.fail_on = Some(handler.to_string());
        self
    }

    /// Makes the first dispatch of `handler` enqueue `event`.
    #[must_use]
    pub fn triggering_once(mut self, handler: &str, event: EventType) -> Self {
        self.trigger_once = Some((handler.to_string(), event));
        self
    }
}

impl ScriptRuntime for FakeRuntime {
    fn language(&self) -> Language {
        self.language
    }

    fn eval(&mut self, _source: &str) -> Result<(), RuntimeError> {
        Ok(())
    }

    fn dispatch(&mut self, handler: &str, payload: &ScriptMap) -> Result<(), RuntimeError> {
        self.calls
            .lock()
            .push((handler.to_string(), payload.clone()));

        let should_chain = self
            .trigger_once
            .as_ref()
            .is_some_and(|(name, _)| name == handler);
        if should_chain {
            let (_, event) = self.trigger_once.take().expect("just matched");
            self.bus.enqueue(event, None);
        }

        if self.fail_on.as_deref() == Some(handler) {
            return Err(RuntimeError::Dispatch {
                language: self.language,
                handler: handler.to_string(),
                message: "scripted failure".into(),
            });
        }
        Ok(())
    }
}
