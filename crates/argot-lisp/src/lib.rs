//! Ketos (Lisp) runtime registrar.
//!
//! Embeds the Ketos interpreter and exposes the bridge as flat functions
//! in its global scope — Ketos has no object values, so the surface is
//! the module-style equivalent of the other languages' helper objects:
//!
//! ```lisp
//! (define (on-message e) (privmsg "#argot" "hello"))
//! (bind "irc.message" "on-message")
//! (unbind "irc.message" "on-message")
//!
//! (trigger "custom.event" '(("who" "rex")))
//!
//! (use-collection "repos")
//! (save "repos" '(("name" "argot")))
//! (fetch "repos" 1)
//! (fetch-all "repos")
//! (index "repos" '("name"))
//! (query "repos" '(("name" "argot")))
//!
//! (setex "seen" 1)          ; data store
//! (getex "seen")
//! (joinchan "#argot")       ; irc
//! (privmsg "#argot" (concat "I am " (currentnick)))
//! (httpget "https://example.com/")
//! (confget "greeting")      ; config
//! (confset "greeting" "hi")
//! ```
//!
//! Mappings are association lists — a list of `("key" value)` pairs —
//! in both directions.
//!
//! Handlers are registered **by name only**: a lambda has no stable
//! canonical rendering to digest, so binding one is rejected at bind
//! time with an error telling the script to define a named function.

mod globals;
mod marshal;
mod runtime;

pub use runtime::LispRuntime;
