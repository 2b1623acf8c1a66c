//! The Ketos `ScriptRuntime` implementation.

use argot_runtime::{BridgeServices, RuntimeError, ScriptRuntime};
use argot_types::{Language, ScriptMap, ScriptValue};
use ketos::Interpreter;

use crate::{globals, marshal};

/// A Ketos interpreter wired to the bridge.
pub struct LispRuntime {
    interp: Interpreter,
}

impl LispRuntime {
    /// Creates a fresh interpreter with the bridge surface registered.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Init`] if registration fails (kept for
    /// signature symmetry with the other registrars; Ketos registration
    /// itself is infallible).
    pub fn new(services: BridgeServices) -> Result<Self, RuntimeError> {
        let interp = Interpreter::new();
        globals::register(&interp, &services);
        tracing::debug!("lisp runtime ready");
        Ok(Self { interp })
    }
}

impl ScriptRuntime for LispRuntime {
    fn language(&self) -> Language {
        Language::Lisp
    }

    fn eval(&mut self, source: &str) -> Result<(), RuntimeError> {
        self.interp
            .run_code(source, None)
            .map(|_| ())
            .map_err(|e| RuntimeError::Eval {
                language: Language::Lisp,
                message: e.to_string(),
            })
    }

    fn dispatch(&mut self, handler: &str, payload: &ScriptMap) -> Result<(), RuntimeError> {
        if self.interp.get_value(handler).is_none() {
            return Err(RuntimeError::HandlerNotFound {
                language: Language::Lisp,
                handler: handler.to_string(),
            });
        }

        let payload = marshal::common_to_ketos(&ScriptValue::Map(payload.clone()));
        self.interp
            .call(handler, vec![payload])
            .map(|_| ())
            .map_err(|e| RuntimeError::Dispatch {
                language: Language::Lisp,
                handler: handler.to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argot_runtime::testing::{self, IrcCall};
    use argot_types::EventType;

    fn runtime(bridge: &testing::TestBridge) -> LispRuntime {
        LispRuntime::new(bridge.services.clone()).expect("lisp runtime")
    }

    #[test]
    fn bind_by_name_then_dispatch() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(
            r#"
            (define (on-message e) (setex "payload" e))
            (bind "irc.message" "on-message")
            "#,
        )
        .unwrap();

        assert_eq!(
            bridge.services.bus.handlers(&EventType::from("irc.message")),
            vec![(Language::Lisp, "on-message".to_string())]
        );

        let mut payload = ScriptMap::new();
        payload.insert("nick".into(), ScriptValue::from("rex"));
        rt.dispatch("on-message", &payload).unwrap();

        // The handler stored the payload; it round-trips as a map.
        assert_eq!(
            bridge.services.data.get("payload"),
            Some(ScriptValue::Map(payload))
        );
    }

    #[test]
    fn binding_a_lambda_is_rejected() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        let err = rt
            .eval(r#"(bind "e" (lambda (x) x))"#)
            .unwrap_err();
        let RuntimeError::Eval { message, .. } = err else {
            panic!("expected eval error");
        };
        assert!(message.contains("named function"));
        assert_eq!(bridge.services.bus.binding_count(), 0);
    }

    #[test]
    fn unbind_is_a_noop_when_absent() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(r#"(unbind "e" "never-bound")"#).unwrap();
        assert_eq!(bridge.services.bus.binding_count(), 0);
    }

    #[test]
    fn trigger_enqueues_with_marshaled_payload() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(r#"(trigger "custom" '(("n" 7)))"#).unwrap();

        let pending = bridge.services.bus.dequeue().unwrap();
        assert_eq!(pending.event, EventType::from("custom"));
        assert_eq!(pending.payload.get("n"), Some(&ScriptValue::Int(7)));
    }

    #[test]
    fn trigger_without_payload_normalizes() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(r#"(trigger "custom")"#).unwrap();
        assert!(bridge.services.bus.dequeue().unwrap().payload.is_empty());
    }

    #[test]
    fn wrong_arity_is_reported_with_context() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        let err = rt.eval(r#"(bind "only-event")"#).unwrap_err();
        let RuntimeError::Eval { message, .. } = err else {
            panic!("expected eval error");
        };
        assert!(message.contains("bind"));
    }

    #[test]
    fn store_round_trip_from_script() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(
            r#"
            (use-collection "repos")
            (setex "id" (save "repos" '(("name" "argot"))))
            (setex "doc" (fetch "repos" (getex "id")))
            "#,
        )
        .unwrap();

        let Some(ScriptValue::Int(id)) = bridge.services.data.get("id") else {
            panic!("id not recorded");
        };
        assert!(id > 0);

        let Some(ScriptValue::Map(doc)) = bridge.services.data.get("doc") else {
            panic!("doc not recorded");
        };
        assert_eq!(doc.get("name"), Some(&ScriptValue::from("argot")));
        assert_eq!(doc.get("ID"), Some(&ScriptValue::Int(id)));

        // Update in place through the flat surface.
        rt.eval(r#"(save "repos" (fetch "repos" (getex "id")))"#)
            .unwrap();
        let coll = bridge.services.store.collection("repos").unwrap();
        assert_eq!(coll.fetch_all().unwrap().len(), 1);
    }

    #[test]
    fn index_and_query_from_script() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(
            r#"
            (index "repos" '("lang"))
            (save "repos" '(("name" "a") ("lang" "lisp")))
            (save "repos" '(("name" "b") ("lang" "lua")))
            (setex "hits" (len (query "repos" '(("lang" "lisp")))))
            (setex "total" (len (fetch-all "repos")))
            "#,
        )
        .unwrap();

        assert_eq!(bridge.services.data.get("hits"), Some(ScriptValue::Int(1)));
        assert_eq!(bridge.services.data.get("total"), Some(ScriptValue::Int(2)));
    }

    #[test]
    fn irc_http_config_helpers() {
        let bridge = testing::bridge();
        bridge.http.insert("https://example.com/", "pong");
        let mut rt = runtime(&bridge);

        rt.eval(
            r##"
            (joinchan "#argot")
            (privmsg "#argot" (concat "hello from " (currentnick)))
            (confset "greeting" "hi")
            (setex "greeting" (confget "greeting"))
            (setex "body" (httpget "https://example.com/"))
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
    fn dispatch_unknown_handler_errors() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);
        let err = rt.dispatch("ghost", &ScriptMap::new()).unwrap_err();
        assert!(matches!(err, RuntimeError::HandlerNotFound { .. }));
    }
}
