//! Rhai runtime registrar.
//!
//! Embeds the Rhai engine and wires the bridge surface into it:
//!
//! ```rhai
//! fn on_message(e) {
//!     irc::Privmsg("#argot", `seen: ${e.nick}`);
//! }
//! bind("irc.message", "on_message");
//!
//! // closures work too; keep the returned name to unbind later
//! let h = bind("irc.join", |e| data::Set("last_join", e.channel));
//! unbind("irc.join", h);
//!
//! let repos = use_collection("repos");
//! let id = repos.Save(#{ name: "argot" });
//! trigger("repo.saved", #{ id: id });
//! ```
//!
//! Host helpers are static modules (`data::Get`, `irc::Join`,
//! `http::Get`, `config::Set`) — the module path is Rhai's natural
//! spelling of the shared surface. The collection opener is spelled
//! `use_collection` because `use` is reserved in Rhai.
//!
//! A closure binds under a synthetic name digested from the engine's own
//! deterministic anonymous-function encoding; the function pointer is
//! retained under that name in the registrar's alias table so dispatch
//! by name reaches the original closure. A `Fn("name")` pointer or a
//! plain string is treated as the name itself.

mod globals;
mod marshal;
mod runtime;

pub use runtime::RhaiRuntime;
