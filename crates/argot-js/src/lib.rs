//! JavaScript runtime registrar.
//!
//! Embeds QuickJS via `rquickjs` and wires the bridge surface into the
//! global object:
//!
//! ```js
//! function onMessage(e) {
//!     irc.Privmsg("#argot", "seen: " + e.nick);
//! }
//! bind("irc.message", "onMessage");
//!
//! // inline handlers get a stable synthetic name
//! var h = bind("irc.join", function (e) { data.Set("last", e.channel); });
//! unbind("irc.join", h);
//!
//! var repos = use("repos");
//! var id = repos.Save({ name: "argot" });
//! trigger("repo.saved", { id: id });
//! ```
//!
//! An inline function's identity is the digest of its source text (what
//! `String(f)` yields), so the same literal always produces the same
//! handler name; the function is simultaneously stored under that name
//! as a global alias for later dispatch-by-name.

mod globals;
mod marshal;
mod runtime;

pub use runtime::JsRuntime;
