//! Bridge surface registration in the Ketos global scope.

use argot_runtime::BridgeServices;
use argot_store::GenericModel;
use argot_types::{EventType, Language, ScriptValue};
use ketos::exec::ExecError;
use ketos::integer::Integer;
use ketos::{Error, Interpreter, Value};

use crate::marshal::{common_to_ketos, docs_to_ketos, ketos_to_common};

/// Builds a script-visible error carrying `message`.
fn script_err(message: String) -> Error {
    Error::from(ExecError::Panic(Some(Value::from(message))))
}

fn expect_arity(fn_name: &str, args: &[Value], expected: usize) -> Result<(), Error> {
    if args.len() != expected {
        return Err(script_err(format!(
            "{fn_name}: expected {expected} argument(s), got {}",
            args.len()
        )));
    }
    Ok(())
}

fn string_arg(fn_name: &str, args: &[Value], index: usize) -> Result<String, Error> {
    match &args[index] {
        Value::String(s) => Ok(s.to_string()),
        other => Err(script_err(format!(
            "{fn_name}: argument {} must be a string, got {}",
            index + 1,
            other.type_name()
        ))),
    }
}

/// Resolves a handler argument to its name.
///
/// Lisp handlers are names only: lambdas carry no stable canonical
/// rendering to digest, so binding one is an identity error.
fn resolve_handler(fn_name: &str, value: &Value) -> Result<String, Error> {
    match value {
        Value::String(s) => Ok(s.to_string()),
        Value::Lambda(_) => Err(script_err(format!(
            "{fn_name}: anonymous functions cannot be bound here; \
             define a named function and pass its name"
        ))),
        other => Err(script_err(format!(
            "{fn_name}: handler must be a string naming a function, got {}",
            other.type_name()
        ))),
    }
}

fn marshal_err(err: argot_types::MarshalError) -> Error {
    script_err(err.to_string())
}

fn store_err(err: argot_store::StoreError) -> Error {
    script_err(err.to_string())
}

/// Registers the flat bridge surface into the interpreter's global scope.
pub fn register(interp: &Interpreter, services: &BridgeServices) {
    let scope = interp.scope();

    let svc = services.clone();
    scope.add_value_with_name("bind", move |name| {
        Value::new_foreign_fn(name, move |_ctx, args| {
            expect_arity("bind", args, 2)?;
            let event = string_arg("bind", args, 0)?;
            let handler = resolve_handler("bind", &args[1])?;
            svc.bus
                .bind(Language::Lisp, EventType::from(event), handler.clone());
            Ok(Value::from(handler))
        })
    });

    let svc = services.clone();
    scope.add_value_with_name("unbind", move |name| {
        Value::new_foreign_fn(name, move |_ctx, args| {
            expect_arity("unbind", args, 2)?;
            let event = string_arg("unbind", args, 0)?;
            let handler = resolve_handler("unbind", &args[1])?;
            svc.bus
                .unbind(Language::Lisp, &EventType::from(event), &handler);
            Ok(Value::Unit)
        })
    });

    let svc = services.clone();
    scope.add_value_with_name("trigger", move |name| {
        Value::new_foreign_fn(name, move |_ctx, args| {
            if args.is_empty() || args.len() > 2 {
                return Err(script_err(format!(
                    "trigger: expected 1 or 2 argument(s), got {}",
                    args.len()
                )));
            }
            let event = string_arg("trigger", args, 0)?;
            let payload = if args.len() == 2 {
                match &args[1] {
                    Value::Unit => None,
                    value => match ketos_to_common(value).map_err(marshal_err)? {
                        ScriptValue::Map(map) => Some(map),
                        other => {
                            return Err(script_err(format!(
                                "trigger: payload must be an association list or (), got {}",
                                other.type_name()
                            )))
                        }
                    },
                }
            } else {
                None
            };
            svc.bus.enqueue(EventType::from(event), payload);
            Ok(Value::Unit)
        })
    });

    // === document store (collection name passed per call) ===

    let svc = services.clone();
    scope.add_value_with_name("use-collection", move |name| {
        Value::new_foreign_fn(name, move |_ctx, args| {
            expect_arity("use-collection", args, 1)?;
            let coll_name = string_arg("use-collection", args, 0)?;
            svc.store.collection(&coll_name).map_err(store_err)?;
            Ok(Value::from(coll_name))
        })
    });

    let svc = services.clone();
    scope.add_value_with_name("save", move |name| {
        Value::new_foreign_fn(name, move |_ctx, args| {
            expect_arity("save", args, 2)?;
            let coll_name = string_arg("save", args, 0)?;
            let common = ketos_to_common(&args[1]).map_err(marshal_err)?;
            let ScriptValue::Map(fields) = common else {
                return Err(script_err(format!(
                    "save: model must be an association list, got {}",
                    common.type_name()
                )));
            };
            let coll = svc.store.collection(&coll_name).map_err(store_err)?;
            let mut model = GenericModel::from(fields);
            let id = coll.save(&mut model).map_err(store_err)?;
            Ok(Value::Integer(Integer::from_i64(id)))
        })
    });

    let svc = services.clone();
    scope.add_value_with_name("fetch", move |name| {
        Value::new_foreign_fn(name, move |_ctx, args| {
            expect_arity("fetch", args, 2)?;
            let coll_name = string_arg("fetch", args, 0)?;
            let id = ketos_to_common(&args[1]).map_err(marshal_err)?;
            let coll = svc.store.collection(&coll_name).map_err(store_err)?;
            match coll.fetch(&id).map_err(store_err)? {
                Some(doc) => Ok(common_to_ketos(&ScriptValue::Map(doc.into_fields()))),
                None => Ok(Value::Unit),
            }
        })
    });

    let svc = services.clone();
    scope.add_value_with_name("fetch-all", move |name| {
        Value::new_foreign_fn(name, move |_ctx, args| {
            expect_arity("fetch-all", args, 1)?;
            let coll_name = string_arg("fetch-all", args, 0)?;
            let coll = svc.store.collection(&coll_name).map_err(store_err)?;
            let docs = coll.fetch_all().map_err(store_err)?;
            Ok(docs_to_ketos(&docs))
        })
    });

    let svc = services.clone();
    scope.add_value_with_name("index", move |name| {
        Value::new_foreign_fn(name, move |_ctx, args| {
            expect_arity("index", args, 2)?;
            let coll_name = string_arg("index", args, 0)?;
            let fields = match &args[1] {
                Value::Unit => Vec::new(),
                Value::List(items) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => Ok(s.to_string()),
                        other => Err(script_err(format!(
                            "index: field names must be strings, got {}",
                            other.type_name()
                        ))),
                    })
                    .collect::<Result<Vec<String>, Error>>()?,
                other => {
                    return Err(script_err(format!(
                        "index: expected a list of field names, got {}",
                        other.type_name()
                    )))
                }
            };
            let coll = svc.store.collection(&coll_name).map_err(store_err)?;
            coll.index(&fields).map_err(store_err)?;
            Ok(Value::Unit)
        })
    });

    let svc = services.clone();
    scope.add_value_with_name("query", move |name| {
        Value::new_foreign_fn(name, move |_ctx, args| {
            expect_arity("query", args, 2)?;
            let coll_name = string_arg("query", args, 0)?;
            let predicate = ketos_to_common(&args[1]).map_err(marshal_err)?;
            let coll = svc.store.collection(&coll_name).map_err(store_err)?;
            let docs = coll.query(&predicate).map_err(store_err)?;
            Ok(docs_to_ketos(&docs))
        })
    });

    // === key/value data ===

    let svc = services.clone();
    scope.add_value_with_name("getex", move |name| {
        Value::new_foreign_fn(name, move |_ctx, args| {
            expect_arity("getex", args, 1)?;
            let key = string_arg("getex", args, 0)?;
            let value = svc.data.get(&key).unwrap_or(ScriptValue::None);
            Ok(common_to_ketos(&value))
        })
    });

    let svc = services.clone();
    scope.add_value_with_name("setex", move |name| {
        Value::new_foreign_fn(name, move |_ctx, args| {
            expect_arity("setex", args, 2)?;
            let key = string_arg("setex", args, 0)?;
            let value = ketos_to_common(&args[1]).map_err(marshal_err)?;
            svc.data.set(&key, value);
            Ok(Value::Unit)
        })
    });

    // === irc ===

    let svc = services.clone();
    scope.add_value_with_name("joinchan", move |name| {
        Value::new_foreign_fn(name, move |_ctx, args| {
            expect_arity("joinchan", args, 1)?;
            svc.irc.join(&string_arg("joinchan", args, 0)?);
            Ok(Value::Unit)
        })
    });

    let svc = services.clone();
    scope.add_value_with_name("partchan", move |name| {
        Value::new_foreign_fn(name, move |_ctx, args| {
            expect_arity("partchan", args, 1)?;
            svc.irc.part(&string_arg("partchan", args, 0)?);
            Ok(Value::Unit)
        })
    });

    let svc = services.clone();
    scope.add_value_with_name("privmsg", move |name| {
        Value::new_foreign_fn(name, move |_ctx, args| {
            expect_arity("privmsg", args, 2)?;
            let target = string_arg("privmsg", args, 0)?;
            let message = string_arg("privmsg", args, 1)?;
            svc.irc.privmsg(&target, &message);
            Ok(Value::Unit)
        })
    });

    let svc = services.clone();
    scope.add_value_with_name("currentnick", move |name| {
        Value::new_foreign_fn(name, move |_ctx, args| {
            expect_arity("currentnick", args, 0)?;
            Ok(Value::from(svc.irc.current_nick()))
        })
    });

    let svc = services.clone();
    scope.add_value_with_name("nick", move |name| {
        Value::new_foreign_fn(name, move |_ctx, args| {
            expect_arity("nick", args, 1)?;
            svc.irc.nick(&string_arg("nick", args, 0)?);
            Ok(Value::Unit)
        })
    });

    // === http ===

    let svc = services.clone();
    scope.add_value_with_name("httpget", move |name| {
        Value::new_foreign_fn(name, move |_ctx, args| {
            expect_arity("httpget", args, 1)?;
            let url = string_arg("httpget", args, 0)?;
            let body = svc.http.get(&url).map_err(|e| script_err(e.to_string()))?;
            Ok(Value::from(body))
        })
    });

    // === config ===

    let svc = services.clone();
    scope.add_value_with_name("confget", move |name| {
        Value::new_foreign_fn(name, move |_ctx, args| {
            expect_arity("confget", args, 1)?;
            let key = string_arg("confget", args, 0)?;
            Ok(match svc.config.get(&key) {
                Some(value) => Value::from(value),
                None => Value::Unit,
            })
        })
    });

    let svc = services.clone();
    scope.add_value_with_name("confset", move |name| {
        Value::new_foreign_fn(name, move |_ctx, args| {
            expect_arity("confset", args, 2)?;
            let key = string_arg("confset", args, 0)?;
            let value = string_arg("confset", args, 1)?;
            svc.config.set(&key, &value);
            Ok(Value::Unit)
        })
    });
}
