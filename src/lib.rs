// Library exports for the binary, integration tests, and embedders.
//
// The store itself lives in the `namecolor-store` crate. This crate is the
// host-facing layer: colors, permissions, config, chat messages, the
// `/namecolor` command, and a console host that stands in for a server.

pub mod debug;

pub mod cli;
pub mod colors;
pub mod command;
pub mod config;
pub mod console;
pub mod host;
pub mod join;
pub mod messages;
pub mod permissions;
pub mod plugin;

pub use colors::NameColor;
pub use config::PluginConfig;
pub use host::{Sender, Server};
pub use plugin::NameColorPlugin;
