//! Contracts between the plugin and the server hosting it.
//!
//! The plugin never owns the session list. It asks the host who is online,
//! what their permissions are, and tells it which names to show and which
//! messages to deliver.

use crate::permissions::Permissible;
use namecolor_store::UserId;

/// Who issued a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    /// The server console. Always an operator.
    Console,
    /// An online player.
    Player(UserId),
}

/// Session and permission API of the hosting server.
pub trait Server {
    /// Ids of every online player.
    fn online_players(&self) -> Vec<UserId>;

    /// Find an online player by name, ignoring case.
    fn find_player(&self, name: &str) -> Option<UserId>;

    /// The plain (uncolored) name of an online player.
    fn player_name(&self, id: &UserId) -> Option<String>;

    /// The name currently shown in chat for an online player.
    fn display_name(&self, id: &UserId) -> Option<String>;

    fn set_display_name(&mut self, id: &UserId, name: String);

    fn set_list_name(&mut self, id: &UserId, name: String);

    fn is_op(&self, sender: &Sender) -> bool;

    fn has_permission(&self, sender: &Sender, node: &str) -> bool;

    /// Deliver a chat line to `to`.
    fn send_message(&mut self, to: &Sender, message: String);
}

/// Adapts a `(server, sender)` pair to [`Permissible`].
pub struct SenderPermissions<'a> {
    server: &'a dyn Server,
    sender: Sender,
}

impl<'a> SenderPermissions<'a> {
    pub fn new(server: &'a dyn Server, sender: Sender) -> Self {
        Self { server, sender }
    }
}

impl Permissible for SenderPermissions<'_> {
    fn is_op(&self) -> bool {
        self.server.is_op(&self.sender)
    }

    fn has_permission(&self, node: &str) -> bool {
        self.server.has_permission(&self.sender, node)
    }
}
