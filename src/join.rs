//! Restores a player's saved color when they connect.

use crate::host::Server;
use crate::plugin::NameColorPlugin;
use namecolor_store::UserId;

impl NameColorPlugin {
    /// Handle a player joining. Players without a saved (valid) color keep
    /// their plain name.
    pub fn on_join(&self, server: &mut dyn Server, id: &UserId) {
        if let Some(color) = self.saved_color(id) {
            log::debug!("Restoring {} name color for {id}", color.name());
            self.apply_color(server, id, color);
        }
    }
}
