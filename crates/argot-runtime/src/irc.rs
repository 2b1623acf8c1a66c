//! IRC session collaborator.

/// The IRC actions the bridge exposes to scripts.
///
/// Implemented by the host's IRC connection; the bridge never speaks the
/// IRC protocol itself. All methods are fire-and-forget from the script's
/// point of view — delivery failures are the session's concern.
pub trait IrcSession: Send + Sync {
    /// Joins a channel.
    fn join(&self, channel: &str);

    /// Parts a channel.
    fn part(&self, channel: &str);

    /// Sends a PRIVMSG to a channel or nick.
    fn privmsg(&self, target: &str, message: &str);

    /// Returns the nick the session currently uses.
    fn current_nick(&self) -> String;

    /// Requests a nick change.
    fn nick(&self, new_nick: &str);
}
