//! Host message channel
//!
//! The host engine owns message delivery between mods. A client only needs to
//! subscribe, broadcast and surface errors to the player.

use crate::message::ModMessage;

/// Message passing supplied by the host.
///
/// Delivery is asynchronous: a subscriber receives messages on a later tick,
/// through whatever dispatch the host uses, or never.
pub trait ModChannel {
    fn register_handler(&self, channel: i64);

    fn unregister_handler(&self, channel: i64);

    fn send(&self, channel: i64, message: ModMessage);

    /// Show a message directly to the player
    fn show_message(&self, sender: &str, text: &str);
}
