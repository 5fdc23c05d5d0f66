//! Plugin lifecycle: enable, reload, disable, and applying colors to names.

use crate::colors::{NameColor, RESET};
use crate::config::PluginConfig;
use crate::host::Server;
use crate::messages::MessageFormatter;
use namecolor_store::{FsDataFile, PreferenceStore, StoreError, TaskScheduler, UserId};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The running plugin: config, message templates, and the preference store.
#[derive(Debug)]
pub struct NameColorPlugin {
    data_folder: PathBuf,
    config: PluginConfig,
    formatter: MessageFormatter,
    store: PreferenceStore,
}

impl NameColorPlugin {
    /// Load config and player data from `data_folder` and restore colors
    /// for everyone already online.
    ///
    /// A broken config file is logged and replaced by defaults in memory;
    /// it is not overwritten on disk.
    pub fn enable(
        data_folder: &Path,
        scheduler: Arc<dyn TaskScheduler>,
        server: &mut dyn Server,
    ) -> Self {
        let config = PluginConfig::load(data_folder).unwrap_or_else(|e| {
            log::error!("Failed to load config, using defaults: {e}");
            PluginConfig::default()
        });

        let data_file = FsDataFile::new(config.data_file_path(data_folder));
        let store = PreferenceStore::builder(Arc::new(data_file), scheduler)
            .flush_wait_timeout(config.flush_wait_timeout())
            .open();

        let plugin = Self {
            data_folder: data_folder.to_path_buf(),
            formatter: MessageFormatter::new(&config),
            config,
            store,
        };
        plugin.reapply_all_colors(server);

        log::info!("NameColor plugin has been enabled!");
        plugin
    }

    /// Persist everything synchronously. Call once at shutdown.
    pub fn disable(&self) -> Result<(), StoreError> {
        let result = self.store.flush_sync();
        log::info!("NameColor plugin has been disabled!");
        result
    }

    pub fn store(&self) -> &PreferenceStore {
        &self.store
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn formatter(&self) -> &MessageFormatter {
        &self.formatter
    }

    pub fn data_folder(&self) -> &Path {
        &self.data_folder
    }

    /// Re-read config and player data, then re-apply colors to everyone
    /// online. Unsaved preference changes are discarded.
    ///
    /// If the player data cannot be loaded the previous colors stay live
    /// and the error is returned; the config reload still takes effect.
    pub fn reload(&mut self, server: &mut dyn Server) -> Result<usize, StoreError> {
        match PluginConfig::load(&self.data_folder) {
            Ok(config) => {
                self.formatter = MessageFormatter::new(&config);
                self.config = config;
            }
            Err(e) => log::error!("Failed to reload config, keeping previous: {e}"),
        }
        let loaded = self.store.reload_from_disk();
        self.reapply_all_colors(server);
        loaded
    }

    /// Apply each online player's saved color, skipping unknown names.
    pub fn reapply_all_colors(&self, server: &mut dyn Server) {
        for id in server.online_players() {
            if let Some(color) = self.saved_color(&id) {
                self.apply_color(server, &id, color);
            }
        }
    }

    /// The saved color for `id`, if it is still a valid color name.
    pub fn saved_color(&self, id: &UserId) -> Option<NameColor> {
        let name = self.store.get(id)?;
        let color = NameColor::from_name(&name);
        if color.is_none() {
            log::warn!("Ignoring unknown saved color '{name}' for {id}");
        }
        color
    }

    /// Color the display name, and the list name if `display.tab-list` is on.
    pub fn apply_color(&self, server: &mut dyn Server, id: &UserId, color: NameColor) {
        let Some(name) = server.player_name(id) else {
            return;
        };
        let colored = format!("{color}{name}{RESET}");
        server.set_display_name(id, colored.clone());
        if self.config.display.tab_list {
            server.set_list_name(id, colored);
        } else {
            server.set_list_name(id, name);
        }
    }

    /// Restore the plain name everywhere.
    pub fn clear_color(&self, server: &mut dyn Server, id: &UserId) {
        if let Some(name) = server.player_name(id) {
            server.set_display_name(id, name.clone());
            server.set_list_name(id, name);
        }
    }
}
