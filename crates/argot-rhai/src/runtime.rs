//! The Rhai `ScriptRuntime` implementation.

use argot_runtime::{BridgeServices, RuntimeError, ScriptRuntime};
use argot_types::{Language, ScriptMap};
use rhai::{Dynamic, Engine, EvalAltResult, Scope, AST};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::globals::{self, AliasTable};
use crate::marshal;

/// A Rhai engine wired to the bridge.
///
/// Keeps one persistent [`Scope`] (top-level variables survive across
/// evals) and one merged [`AST`] carrying every function definition
/// loaded so far, so dispatch-by-name can reach any previously evaluated
/// handler.
pub struct RhaiRuntime {
    engine: Engine,
    scope: Scope<'static>,
    ast: AST,
    aliases: AliasTable,
}

impl RhaiRuntime {
    /// Creates a fresh engine with the bridge surface registered.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Init`] if registration fails (kept for
    /// signature symmetry with the other registrars; Rhai registration
    /// itself is infallible).
    pub fn new(services: BridgeServices) -> Result<Self, RuntimeError> {
        let mut engine = Engine::new();
        let aliases: AliasTable = Rc::new(RefCell::new(HashMap::new()));
        globals::register(&mut engine, &services, &aliases);
        tracing::debug!("rhai runtime ready");
        Ok(Self {
            engine,
            scope: Scope::new(),
            ast: AST::empty(),
            aliases,
        })
    }

    fn dispatch_err(&self, handler: &str, err: &EvalAltResult) -> RuntimeError {
        RuntimeError::Dispatch {
            language: Language::Rhai,
            handler: handler.to_string(),
            message: err.to_string(),
        }
    }
}

impl ScriptRuntime for RhaiRuntime {
    fn language(&self) -> Language {
        Language::Rhai
    }

    fn eval(&mut self, source: &str) -> Result<(), RuntimeError> {
        let ast = self.engine.compile(source).map_err(|e| RuntimeError::Eval {
            language: Language::Rhai,
            message: e.to_string(),
        })?;
        self.engine
            .run_ast_with_scope(&mut self.scope, &ast)
            .map_err(|e| RuntimeError::Eval {
                language: Language::Rhai,
                message: e.to_string(),
            })?;
        // Keep the chunk's function definitions reachable for dispatch;
        // later definitions of the same name override earlier ones.
        self.ast = self.ast.merge(&ast);
        Ok(())
    }

    fn dispatch(&mut self, handler: &str, payload: &ScriptMap) -> Result<(), RuntimeError> {
        let payload = Dynamic::from(marshal::map_to_rhai(payload));

        // Aliases first: anonymous closures bound under synthetic names.
        let alias = self.aliases.borrow().get(handler).cloned();
        if let Some(fp) = alias {
            return fp
                .call::<Dynamic>(&self.engine, &self.ast, (payload,))
                .map(|_| ())
                .map_err(|e| self.dispatch_err(handler, &e));
        }

        match self
            .engine
            .call_fn::<Dynamic>(&mut self.scope, &self.ast, handler, (payload,))
        {
            Ok(_) => Ok(()),
            Err(err) => match *err {
                EvalAltResult::ErrorFunctionNotFound(ref name, _)
                    if name.starts_with(handler) =>
                {
                    Err(RuntimeError::HandlerNotFound {
                        language: Language::Rhai,
                        handler: handler.to_string(),
                    })
                }
                ref other => Err(self.dispatch_err(handler, other)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argot_runtime::testing::{self, IrcCall};
    use argot_types::{EventType, ScriptValue};

    fn runtime(bridge: &testing::TestBridge) -> RhaiRuntime {
        RhaiRuntime::new(bridge.services.clone()).expect("rhai runtime")
    }

    #[test]
    fn bind_by_name_then_dispatch() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(
            r#"
            fn on_message(e) {
                data::Set("last_nick", e.nick);
            }
            bind("irc.message", "on_message");
            "#,
        )
        .unwrap();

        assert_eq!(
            bridge.services.bus.handlers(&EventType::from("irc.message")),
            vec![(Language::Rhai, "on_message".to_string())]
        );

        let mut payload = ScriptMap::new();
        payload.insert("nick".into(), ScriptValue::from("rex"));
        rt.dispatch("on_message", &payload).unwrap();

        assert_eq!(
            bridge.services.data.get("last_nick"),
            Some(ScriptValue::from("rex"))
        );
    }

    #[test]
    fn closure_bind_is_deterministic_and_dispatchable() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        let source = r#"
            let h = bind("e", |ev| data::Set("hit", true));
            data::Set("name", h);
        "#;
        rt.eval(source).unwrap();
        let first = bridge.services.data.get("name");

        rt.eval(source).unwrap();
        let second = bridge.services.data.get("name");

        // Same literal, same synthetic name, one binding.
        assert_eq!(first, second);
        assert_eq!(bridge.services.bus.binding_count(), 1);

        let Some(ScriptValue::Str(name)) = first else {
            panic!("handler name not recorded");
        };
        assert!(argot_types::identity::is_synthetic(&name));

        rt.dispatch(&name, &ScriptMap::new()).unwrap();
        assert_eq!(bridge.services.data.get("hit"), Some(ScriptValue::Bool(true)));
    }

    #[test]
    fn unbind_with_returned_name() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(
            r#"
            let h = bind("e", |ev| ());
            unbind("e", h);
            "#,
        )
        .unwrap();
        assert_eq!(bridge.services.bus.binding_count(), 0);
    }

    #[test]
    fn trigger_enqueues_with_marshaled_payload() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(r#"trigger("custom", #{ n: 7 });"#).unwrap();

        let pending = bridge.services.bus.dequeue().unwrap();
        assert_eq!(pending.event, EventType::from("custom"));
        assert_eq!(pending.payload.get("n"), Some(&ScriptValue::Int(7)));
    }

    #[test]
    fn trigger_without_payload_normalizes() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(r#"trigger("custom");"#).unwrap();
        assert!(bridge.services.bus.dequeue().unwrap().payload.is_empty());
    }

    #[test]
    fn store_round_trip_from_script() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(
            r#"
            let repos = use_collection("repos");
            let id = repos.Save(#{ name: "argot" });
            data::Set("id", id);
            let doc = repos.Fetch(id);
            data::Set("fetched_name", doc.name);
            doc.name = "renamed";
            repos.Save(doc);
            data::Set("count", repos.FetchAll().len());
            repos.Index(["name"]);
            data::Set("hits", repos.Query(#{ name: "renamed" }).len());
            "#,
        )
        .unwrap();

        let Some(ScriptValue::Int(id)) = bridge.services.data.get("id") else {
            panic!("id not recorded");
        };
        assert!(id > 0);
        assert_eq!(
            bridge.services.data.get("fetched_name"),
            Some(ScriptValue::from("argot"))
        );
        assert_eq!(bridge.services.data.get("count"), Some(ScriptValue::Int(1)));
        assert_eq!(bridge.services.data.get("hits"), Some(ScriptValue::Int(1)));
    }

    #[test]
    fn irc_http_config_helpers() {
        let bridge = testing::bridge();
        bridge.http.insert("https://example.com/", "pong");
        let mut rt = runtime(&bridge);

        rt.eval(
            r##"
            irc::Join("#argot");
            irc::Privmsg("#argot", "hello from " + irc::CurrentNick());
            config::Set("greeting", "hi");
            data::Set("greeting", config::Get("greeting"));
            data::Set("body", http::Get("https://example.com/"));
            "##,
        )
        .unwrap();

        assert_eq!(
            bridge.irc.calls(),
            vec![
                IrcCall::Join("#argot".into()),
                IrcCall::Privmsg("#argot".into(), "hello from argot".into()),
            ]
        );
        assert_eq!(
            bridge.services.data.get("greeting"),
            Some(ScriptValue::from("hi"))
        );
        assert_eq!(
            bridge.services.data.get("body"),
            Some(ScriptValue::from("pong"))
        );
    }

    #[test]
    fn marshal_error_is_catchable() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(
            r#"
            let caught = false;
            try {
                data::Set("cb", |x| x);
            } catch (e) {
                caught = true;
            }
            data::Set("caught", caught);
            "#,
        )
        .unwrap();

        assert_eq!(
            bridge.services.data.get("caught"),
            Some(ScriptValue::Bool(true))
        );
        assert!(bridge.services.data.get("cb").is_none());
    }

    #[test]
    fn dispatch_unknown_handler_errors() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);
        let err = rt.dispatch("ghost", &ScriptMap::new()).unwrap_err();
        assert!(matches!(err, RuntimeError::HandlerNotFound { .. }));
    }

    #[test]
    fn handler_error_is_a_dispatch_error() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);
        rt.eval(r#"fn broken(e) { throw "boom"; }"#).unwrap();

        let err = rt.dispatch("broken", &ScriptMap::new()).unwrap_err();
        assert!(matches!(err, RuntimeError::Dispatch { .. }));
    }
}
