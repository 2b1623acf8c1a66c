//! Assembly layer for the argot scripting bridge.
//!
//! [`BridgeBuilder`] wires the four embedded runtimes and the default
//! collaborators into a ready [`ScriptManager`]:
//!
//! ```no_run
//! use std::sync::Arc;
//! use argot_app::BridgeBuilder;
//! use argot_runtime::testing::RecordingIrc;
//! use argot_types::{EventType, Language};
//!
//! let irc = Arc::new(RecordingIrc::new());
//! let mut manager = BridgeBuilder::new(irc).build().unwrap();
//!
//! manager
//!     .eval(
//!         Language::Lua,
//!         r#"bind("irc.message", function(e) irc.Privmsg(e.channel, "hi") end)"#,
//!     )
//!     .unwrap();
//!
//! // Host side: an IRC message arrived.
//! let mut payload = argot_types::ScriptMap::new();
//! payload.insert("channel".into(), "#argot".into());
//! manager.trigger(EventType::from("irc.message"), Some(payload));
//! ```
//!
//! The host supplies its IRC session; everything else defaults to the
//! in-process implementations (`MemoryStore`, `MemoryKv`, `MemoryConfig`,
//! `UreqClient`) and can be swapped through the builder.

mod builder;

pub use builder::BridgeBuilder;

// The assembled surface, re-exported for hosts that only depend on this
// crate.
pub use argot_event::EventBus;
pub use argot_runtime::{
    BridgeServices, ConfigStore, HttpClient, IrcSession, KvStore, RuntimeError, ScriptManager,
    ScriptRuntime,
};
pub use argot_store::{DocumentStore, JsonFileStore, MemoryStore, StoreAdapter};
pub use argot_types::{EventType, Language, ScriptMap, ScriptValue};
