//! Lua runtime registrar.
//!
//! Embeds Lua 5.4 via `mlua` and wires the bridge surface into its
//! globals:
//!
//! ```lua
//! -- named or anonymous handlers
//! bind("irc.message", "on_message")
//! local h = bind("irc.join", function(e) irc.Privmsg(e.channel, "hi") end)
//! unbind("irc.join", h)
//!
//! trigger("custom.event", { who = irc.CurrentNick() })
//!
//! local repos = use("repos")
//! local id = repos.Save({ name = "argot" })
//!
//! data.Set("seen", (data.Get("seen") or 0) + 1)
//! config.Set("greeting", "hello")
//! local body = http.Get("https://example.com/")
//! ```
//!
//! Anonymous handlers get their identity from `string.dump` of the
//! function with debug info stripped, so the same literal always digests
//! to the same synthetic name; the closure is simultaneously registered
//! under that name as a global alias for later dispatch-by-name.

mod globals;
mod marshal;
mod runtime;

pub use runtime::LuaRuntime;
