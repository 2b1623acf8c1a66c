//! The Lua `ScriptRuntime` implementation.

use argot_runtime::{BridgeServices, RuntimeError, ScriptRuntime};
use argot_types::{Language, ScriptMap};
use mlua::{Lua, Value};

use crate::{globals, marshal};

/// A Lua 5.4 interpreter wired to the bridge.
pub struct LuaRuntime {
    lua: Lua,
}

impl LuaRuntime {
    /// Creates a fresh interpreter with the bridge surface registered.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Init`] if registration fails.
    pub fn new(services: BridgeServices) -> Result<Self, RuntimeError> {
        let lua = Lua::new();
        globals::register(&lua, &services).map_err(|e| RuntimeError::Init {
            language: Language::Lua,
            message: e.to_string(),
        })?;
        tracing::debug!("lua runtime ready");
        Ok(Self { lua })
    }
}

impl ScriptRuntime for LuaRuntime {
    fn language(&self) -> Language {
        Language::Lua
    }

    fn eval(&mut self, source: &str) -> Result<(), RuntimeError> {
        self.lua
            .load(source)
            .exec()
            .map_err(|e| RuntimeError::Eval {
                language: Language::Lua,
                message: e.to_string(),
            })
    }

    fn dispatch(&mut self, handler: &str, payload: &ScriptMap) -> Result<(), RuntimeError> {
        let value: Value = self
            .lua
            .globals()
            .get(handler)
            .map_err(|e| RuntimeError::Dispatch {
                language: Language::Lua,
                handler: handler.to_string(),
                message: e.to_string(),
            })?;
        let Value::Function(func) = value else {
            return Err(RuntimeError::HandlerNotFound {
                language: Language::Lua,
                handler: handler.to_string(),
            });
        };

        let payload =
            marshal::map_to_table(&self.lua, payload).map_err(|e| RuntimeError::Dispatch {
                language: Language::Lua,
                handler: handler.to_string(),
                message: e.to_string(),
            })?;
        func.call::<()>(payload).map_err(|e| RuntimeError::Dispatch {
            language: Language::Lua,
            handler: handler.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argot_runtime::testing::{self, IrcCall};
    use argot_types::{EventType, ScriptValue};

    fn runtime(bridge: &testing::TestBridge) -> LuaRuntime {
        LuaRuntime::new(bridge.services.clone()).expect("lua runtime")
    }

    #[test]
    fn bind_by_name_then_dispatch() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(
            r#"
            function on_message(e)
                data.Set("last_nick", e.nick)
            end
            bind("irc.message", "on_message")
            "#,
        )
        .unwrap();

        let handlers = bridge.services.bus.handlers(&EventType::from("irc.message"));
        assert_eq!(handlers, vec![(Language::Lua, "on_message".to_string())]);

        let mut payload = ScriptMap::new();
        payload.insert("nick".into(), ScriptValue::from("rex"));
        rt.dispatch("on_message", &payload).unwrap();

        assert_eq!(
            bridge.services.data.get("last_nick"),
            Some(ScriptValue::from("rex"))
        );
    }

    #[test]
    fn anonymous_bind_is_deterministic_and_dispatchable() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(
            r#"
            h1 = bind("e", function(ev) data.Set("hits", (data.Get("hits") or 0) + 1) end)
            h2 = bind("e", function(ev) data.Set("hits", (data.Get("hits") or 0) + 1) end)
            data.Set("same_name", h1 == h2)
            data.Set("handler_name", h1)
            "#,
        )
        .unwrap();

        assert_eq!(
            bridge.services.data.get("same_name"),
            Some(ScriptValue::Bool(true))
        );
        // Identical literals collapse to one binding.
        assert_eq!(bridge.services.bus.binding_count(), 1);

        let Some(ScriptValue::Str(name)) = bridge.services.data.get("handler_name") else {
            panic!("handler name not recorded");
        };
        assert!(argot_types::identity::is_synthetic(&name));

        rt.dispatch(&name, &ScriptMap::new()).unwrap();
        assert_eq!(bridge.services.data.get("hits"), Some(ScriptValue::Int(1)));
    }

    #[test]
    fn unbind_with_returned_name() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(
            r#"
            local h = bind("e", function(ev) end)
            unbind("e", h)
            "#,
        )
        .unwrap();
        assert_eq!(bridge.services.bus.binding_count(), 0);
    }

    #[test]
    fn trigger_enqueues_with_marshaled_payload() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(r#"trigger("custom", { n = 7 })"#).unwrap();

        let pending = bridge.services.bus.dequeue().unwrap();
        assert_eq!(pending.event, EventType::from("custom"));
        assert_eq!(pending.payload.get("n"), Some(&ScriptValue::Int(7)));
    }

    #[test]
    fn trigger_without_payload_normalizes() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(r#"trigger("custom")"#).unwrap();
        assert!(bridge.services.bus.dequeue().unwrap().payload.is_empty());
    }

    #[test]
    fn bind_rejects_non_callable() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(
            r#"
            local ok, err = pcall(function() bind("e", 42) end)
            data.Set("ok", ok)
            data.Set("err", tostring(err))
            "#,
        )
        .unwrap();

        assert_eq!(bridge.services.data.get("ok"), Some(ScriptValue::Bool(false)));
        let Some(ScriptValue::Str(err)) = bridge.services.data.get("err") else {
            panic!("error not recorded");
        };
        assert!(err.contains("bind"));
    }

    #[test]
    fn store_round_trip_from_script() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(
            r#"
            local repos = use("repos")
            local id = repos.Save({ name = "argot" })
            data.Set("id", id)
            local doc = repos.Fetch(id)
            data.Set("fetched_name", doc.name)
            doc.name = "renamed"
            repos.Save(doc)
            data.Set("count", #repos.FetchAll())
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

        let coll = bridge.services.store.collection("repos").unwrap();
        let doc = coll.fetch_by_id(id).unwrap().unwrap();
        assert_eq!(doc.get("name"), Some(&ScriptValue::from("renamed")));
    }

    #[test]
    fn index_and_query_from_script() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(
            r#"
            local repos = use("repos")
            repos.Index({ "lang" })
            repos.Save({ name = "a", lang = "lua" })
            repos.Save({ name = "b", lang = "rhai" })
            local hits = repos.Query({ lang = "lua" })
            data.Set("hits", #hits)
            data.Set("first", hits[1].name)
            "#,
        )
        .unwrap();

        assert_eq!(bridge.services.data.get("hits"), Some(ScriptValue::Int(1)));
        assert_eq!(
            bridge.services.data.get("first"),
            Some(ScriptValue::from("a"))
        );
    }

    #[test]
    fn irc_helpers_reach_the_session() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(
            r#"
            irc.Join("#argot")
            irc.Privmsg("#argot", "hello from " .. irc.CurrentNick())
            irc.Part("#argot")
            "#,
        )
        .unwrap();

        assert_eq!(
            bridge.irc.calls(),
            vec![
                IrcCall::Join("#argot".into()),
                IrcCall::Privmsg("#argot".into(), "hello from argot".into()),
                IrcCall::Part("#argot".into()),
            ]
        );
    }

    #[test]
    fn http_and_config_helpers() {
        let bridge = testing::bridge();
        bridge.http.insert("https://example.com/", "pong");
        let mut rt = runtime(&bridge);

        rt.eval(
            r#"
            config.Set("greeting", "hi")
            data.Set("greeting", config.Get("greeting"))
            data.Set("body", http.Get("https://example.com/"))
            "#,
        )
        .unwrap();

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
    fn http_error_is_catchable() {
        let bridge = testing::bridge();
        let mut rt = runtime(&bridge);

        rt.eval(
            r#"
            local ok = pcall(function() return http.Get("https://missing.example/") end)
            data.Set("ok", ok)
            "#,
        )
        .unwrap();
        assert_eq!(bridge.services.data.get("ok"), Some(ScriptValue::Bool(false)));
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
        rt.eval(r#"function broken(e) error("boom") end"#).unwrap();

        let err = rt.dispatch("broken", &ScriptMap::new()).unwrap_err();
        assert!(matches!(err, RuntimeError::Dispatch { .. }));
    }
}
