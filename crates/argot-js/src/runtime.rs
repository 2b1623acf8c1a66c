//! The JavaScript `ScriptRuntime` implementation.

use argot_runtime::{BridgeServices, RuntimeError, ScriptRuntime};
use argot_types::{Language, ScriptMap};
use rquickjs::{Context, Ctx, Runtime, Value};

use crate::{globals, marshal};

/// A QuickJS context wired to the bridge.
pub struct JsRuntime {
    // The runtime must stay alive as long as the context; both are
    // reference-counted handles.
    _runtime: Runtime,
    context: Context,
}

/// Renders an engine error, draining a pending exception if there is one.
fn error_text(ctx: &Ctx<'_>, err: &rquickjs::Error) -> String {
    if matches!(err, rquickjs::Error::Exception) {
        let caught = ctx.catch();
        if let Some(exception) = caught.as_exception() {
            if let Some(message) = exception.message() {
                return message;
            }
        }
        return format!("{caught:?}");
    }
    err.to_string()
}

impl JsRuntime {
    /// Creates a fresh QuickJS context with the bridge surface registered.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Init`] if the engine or the registration
    /// fails.
    pub fn new(services: BridgeServices) -> Result<Self, RuntimeError> {
        let init_err = |message: String| RuntimeError::Init {
            language: Language::JavaScript,
            message,
        };

        let runtime = Runtime::new().map_err(|e| init_err(e.to_string()))?;
        let context = Context::full(&runtime).map_err(|e| init_err(e.to_string()))?;
        context
            .with(|ctx| globals::register(&ctx, &services))
            .map_err(|e| init_err(e.to_string()))?;
        tracing::debug!("javascript runtime ready");

        Ok(Self {
            _runtime: runtime,
            context,
        })
    }
}

impl ScriptRuntime for JsRuntime {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn eval(&mut self, source: &str) -> Result<(), RuntimeError> {
        self.context.with(|ctx| {
            ctx.eval::<(), _>(source).map_err(|e| RuntimeError::Eval {
                language: Language::JavaScript,
                message: error_text(&ctx, &e),
            })
        })
    }

    fn dispatch(&mut self, handler: &str, payload: &ScriptMap) -> Result<(), RuntimeError> {
        self.context.with(|ctx| {
            let dispatch_err = |ctx: &Ctx<'_>, e: &rquickjs::Error| RuntimeError::Dispatch {
                language: Language::JavaScript,
                handler: handler.to_string(),
                message: error_text(ctx, e),
            };

            let value: Value = ctx
                .globals()
                .get(handler)
                .map_err(|e| dispatch_err(&ctx, &e))?;
            let Some(func) = value.as_function().cloned() else {
                return Err(RuntimeError::HandlerNotFound {
                    language: Language::JavaScript,
                    handler: handler.to_string(),
                });
            };

            let payload = marshal::map_to_object(&ctx, payload)
                .map_err(|e| dispatch_err(&ctx, &e))?;
            func.call::<_, ()>((payload,))
                .map_err(|e| dispatch_err(&ctx, &e))
        })
    }
}
