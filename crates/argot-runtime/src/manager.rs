//! The script manager and its dispatch loop.

use argot_types::{EventType, Language, ScriptMap};
use tracing::{debug, error, warn};

use crate::{BridgeServices, RuntimeError, ScriptRuntime};

/// Owns the embedded runtimes and drives all dispatch.
///
/// The manager is the **only** code that invokes an interpreter. Script
/// code that calls `trigger` enqueues onto the shared bus; the manager's
/// drain loop delivers queued events one at a time after the current
/// interpreter call returns. Nested triggers are therefore delivered
/// after the current event's fan-out completes, each handler still
/// exactly once per trigger, in bind order.
///
/// Dispatch failures are isolated: a failing handler is logged with its
/// `(language, event, handler)` context and delivery continues with the
/// next binding. The host process never dies on a script error.
pub struct ScriptManager {
    services: BridgeServices,
    runtimes: Vec<Box<dyn ScriptRuntime>>,
}

impl ScriptManager {
    /// Creates a manager with no runtimes registered.
    #[must_use]
    pub fn new(services: BridgeServices) -> Self {
        Self {
            services,
            runtimes: Vec::new(),
        }
    }

    /// Returns the shared collaborator bundle.
    #[must_use]
    pub fn services(&self) -> &BridgeServices {
        &self.services
    }

    /// Registers a runtime.
    ///
    /// Registering a second runtime for the same language discards the
    /// first, including every binding it owned — bindings do not survive
    /// interpreter teardown.
    pub fn register(&mut self, runtime: Box<dyn ScriptRuntime>) {
        let language = runtime.language();
        if let Some(pos) = self
            .runtimes
            .iter()
            .position(|r| r.language() == language)
        {
            warn!(%language, "replacing runtime; dropping its bindings");
            self.services.bus.clear_language(language);
            self.runtimes[pos] = runtime;
        } else {
            debug!(%language, "runtime registered");
            self.runtimes.push(runtime);
        }
    }

    /// Removes a language's runtime and every binding it owned.
    ///
    /// Returns `false` if no such runtime was registered.
    pub fn remove(&mut self, language: Language) -> bool {
        let Some(pos) = self
            .runtimes
            .iter()
            .position(|r| r.language() == language)
        else {
            return false;
        };
        self.runtimes.remove(pos);
        self.services.bus.clear_language(language);
        debug!(%language, "runtime removed");
        true
    }

    /// Languages with a registered runtime, in registration order.
    #[must_use]
    pub fn languages(&self) -> Vec<Language> {
        self.runtimes.iter().map(|r| r.language()).collect()
    }

    /// Evaluates a source chunk in the given language, then delivers any
    /// events the chunk triggered.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::LanguageUnavailable`] if no such runtime is
    /// registered; otherwise the runtime's own eval error. Events
    /// enqueued before a mid-chunk failure are still delivered.
    pub fn eval(&mut self, language: Language, source: &str) -> Result<(), RuntimeError> {
        let runtime = self
            .runtimes
            .iter_mut()
            .find(|r| r.language() == language)
            .ok_or(RuntimeError::LanguageUnavailable(language))?;

        let result = runtime.eval(source);
        self.drain();
        result
    }

    /// Triggers an event from the host side and delivers it (and anything
    /// it causes) to every bound handler across all languages.
    ///
    /// An absent payload is delivered as an empty mapping. Triggering an
    /// event with no bindings anywhere is a no-op.
    pub fn trigger(&mut self, event: EventType, payload: Option<ScriptMap>) {
        self.services.bus.enqueue(event, payload);
        self.drain();
    }

    /// Delivers queued events until the queue is empty.
    ///
    /// Handlers run sequentially in global bind order. Each dispatch is
    /// isolated; a handler that enqueues further events extends the loop.
    fn drain(&mut self) {
        while let Some(pending) = self.services.bus.dequeue() {
            let handlers = self.services.bus.handlers(&pending.event);
            if handlers.is_empty() {
                debug!(event = %pending.event, "trigger with no bindings, skipping");
                continue;
            }

            for (language, handler) in handlers {
                let Some(runtime) = self
                    .runtimes
                    .iter_mut()
                    .find(|r| r.language() == language)
                else {
                    warn!(
                        %language,
                        event = %pending.event,
                        %handler,
                        "binding owned by unavailable runtime, skipping"
                    );
                    continue;
                };

                if let Err(err) = runtime.dispatch(&handler, &pending.payload) {
                    error!(
                        %language,
                        event = %pending.event,
                        %handler,
                        error = %err,
                        "handler dispatch failed"
                    );
                }
            }
        }
    }
}
