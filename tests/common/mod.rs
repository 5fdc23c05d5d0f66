//! Shared integration test helpers for namecolor.
//!
//! Include with `mod common;` at the top of each test file. The
//! `#[allow(dead_code)]` suppresses warnings when a file uses only some of
//! the helpers.

#![allow(dead_code)]

use namecolor::console::ConsoleServer;
use namecolor::host::Sender;
use namecolor::plugin::NameColorPlugin;
use namecolor_store::{ManualScheduler, UserId};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Config used by [`TestContext::new`]: the scheduler in tests never runs
/// flushes on its own, so keep the shutdown wait short.
pub const FAST_FLUSH_CONFIG: &str = "storage:\n  flush-wait-timeout-ms: 100\n";

/// A plugin enabled against a temp data folder, a console server, and a
/// scheduler whose flushes run only when the test says so.
///
/// Keep the context alive for the whole test; dropping it removes the
/// data folder.
pub struct TestContext {
    pub temp_dir: TempDir,
    pub scheduler: Arc<ManualScheduler>,
    pub server: ConsoleServer,
    pub plugin: NameColorPlugin,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(Some(FAST_FLUSH_CONFIG))
    }

    /// Like [`TestContext::new`] but writes `config_yaml` to `config.yaml`
    /// before enabling.
    pub fn with_config(config_yaml: Option<&str>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        if let Some(yaml) = config_yaml {
            fs::write(temp_dir.path().join("config.yaml"), yaml).expect("Failed to write config");
        }
        let scheduler = Arc::new(ManualScheduler::new());
        let mut server = ConsoleServer::new();
        let plugin = NameColorPlugin::enable(temp_dir.path(), scheduler.clone(), &mut server);
        Self {
            temp_dir,
            scheduler,
            server,
            plugin,
        }
    }

    /// Connect `name` and run the join handler.
    pub fn join(&mut self, name: &str) -> UserId {
        let id = self.server.connect(name);
        self.plugin.on_join(&mut self.server, &id);
        id
    }

    pub fn op(&mut self, id: &UserId) {
        self.server.player_mut(id).expect("player online").op = true;
    }

    pub fn grant(&mut self, id: &UserId, node: &str) {
        self.server
            .player_mut(id)
            .expect("player online")
            .permissions
            .insert(node.to_string());
    }

    /// Run `/namecolor` and return the messages it produced.
    pub fn command(&mut self, sender: Sender, args: &[&str]) -> Vec<(Sender, String)> {
        self.plugin.on_command(&mut self.server, sender, args);
        self.server.drain_messages()
    }

    pub fn display_name(&self, id: &UserId) -> String {
        self.server.player(id).expect("player online").display_name.clone()
    }

    pub fn list_name(&self, id: &UserId) -> String {
        self.server.player(id).expect("player online").list_name.clone()
    }

    pub fn data_file(&self) -> PathBuf {
        self.temp_dir.path().join(namecolor_store::DATA_FILE_NAME)
    }

    pub fn data_file_contents(&self) -> String {
        fs::read_to_string(self.data_file()).unwrap_or_default()
    }
}

/// True if any message sent to `to` contains `needle`.
pub fn received(messages: &[(Sender, String)], to: Sender, needle: &str) -> bool {
    messages
        .iter()
        .any(|(recipient, text)| *recipient == to && text.contains(needle))
}
