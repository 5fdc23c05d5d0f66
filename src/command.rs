//! The `/namecolor` command and its tab completion.
//!
//! ```text
//! /namecolor <color>            change your own color
//! /namecolor reset              remove your color
//! /namecolor list               colors you may use
//! /namecolor help               usage
//! /namecolor <player> <color>   admin: set another player's color
//! /namecolor <player> reset     admin: reset another player's color
//! /namecolor reload             op: reload config and player data
//! ```

use crate::colors::{self, NameColor};
use crate::host::{Sender, SenderPermissions, Server};
use crate::permissions;
use crate::plugin::NameColorPlugin;
use namecolor_store::UserId;

const RESET_ARG: &str = "reset";

impl NameColorPlugin {
    /// Run `/namecolor` with `args` on behalf of `sender`. Every outcome is
    /// reported to the sender (and, for admin actions, the target) as chat.
    pub fn on_command(&mut self, server: &mut dyn Server, sender: Sender, args: &[&str]) {
        let first = args.first().map(|a| a.to_lowercase());
        match first.as_deref() {
            Some("reload") => return self.handle_reload(server, sender),
            Some("help") => return self.handle_help(server, sender),
            Some("list") => return self.handle_list(server, sender),
            _ => {}
        }

        if let [target, color] = args {
            return self.handle_admin(server, sender, target, color);
        }

        let Sender::Player(id) = sender else {
            let message = self.formatter().format("player-only", &[]);
            server.send_message(&sender, message);
            return;
        };

        match first.as_deref() {
            None => self.handle_help(server, sender),
            Some(RESET_ARG) => self.handle_reset(server, &id),
            Some(name) => self.handle_set_own(server, &id, name),
        }
    }

    fn handle_reload(&mut self, server: &mut dyn Server, sender: Sender) {
        if !permissions::can_reload(&SenderPermissions::new(&*server, sender)) {
            let message = self.formatter().format("reload-no-permission", &[]);
            server.send_message(&sender, message);
            return;
        }

        let message = match self.reload(server) {
            Ok(count) => {
                log::info!("NameColor reloaded ({count} player colors)");
                self.formatter().format("reload-success", &[])
            }
            Err(e) => {
                log::warn!("NameColor reloaded config, but player data was kept: {e}");
                self.formatter().format("reload-data-failed", &[])
            }
        };
        server.send_message(&sender, message);
    }

    fn handle_help(&self, server: &mut dyn Server, sender: Sender) {
        let formatter = self.formatter();
        let (is_admin, can_reload) = {
            let perms = SenderPermissions::new(&*server, sender);
            (
                permissions::is_admin(&perms),
                permissions::can_reload(&perms),
            )
        };

        let mut lines = vec![
            format!("{} {}", formatter.prefix(), formatter.help("header")),
            formatter.help("change-color"),
            formatter.help("reset-color"),
            formatter.help("list-colors"),
            formatter.help("show-help"),
        ];
        if is_admin {
            lines.push(String::new());
            lines.push(format!("{} {}", formatter.prefix(), formatter.help("admin-header")));
            lines.push(formatter.help("admin-change-color"));
            lines.push(formatter.help("admin-reset-color"));
        }
        if can_reload {
            lines.push(formatter.help("reload-command"));
        }

        for line in lines {
            server.send_message(&sender, line);
        }
    }

    fn handle_list(&self, server: &mut dyn Server, sender: Sender) {
        if !matches!(sender, Sender::Player(_)) {
            let message = self.formatter().format("player-only", &[]);
            server.send_message(&sender, message);
            return;
        }

        let available = permissions::available_colors(&SenderPermissions::new(&*server, sender));
        let message = if available.is_empty() {
            self.formatter().format("no-colors-available", &[])
        } else {
            let list = colors::formatted_list(&available);
            self.formatter().format("color-list", &[("{colors}", list.as_str())])
        };
        server.send_message(&sender, message);
    }

    fn handle_reset(&self, server: &mut dyn Server, id: &UserId) {
        self.clear_color(server, id);
        self.store().remove(id);
        let message = self.formatter().format("color-reset", &[]);
        server.send_message(&Sender::Player(*id), message);
    }

    fn handle_set_own(&self, server: &mut dyn Server, id: &UserId, name: &str) {
        let sender = Sender::Player(*id);
        let available = permissions::available_colors(&SenderPermissions::new(&*server, sender));

        let Some(color) = NameColor::from_name(name) else {
            let list = colors::formatted_list(&available);
            let message = self.formatter().format("invalid-color", &[("{colors}", list.as_str())]);
            server.send_message(&sender, message);
            return;
        };

        if !available.contains(&color) {
            let message = self
                .formatter()
                .format("no-permission", &[("{color}", color.name())]);
            server.send_message(&sender, message);
            return;
        }

        self.apply_color(server, id, color);
        self.store().set(*id, color.name());

        let painted = color.paint(color.name());
        let display = server.display_name(id).unwrap_or_default();
        let message = self
            .formatter()
            .format("color-changed", &[("{color}", painted.as_str()), ("{name}", display.as_str())]);
        server.send_message(&sender, message);
    }

    fn handle_admin(&self, server: &mut dyn Server, sender: Sender, target_name: &str, color_arg: &str) {
        if !permissions::is_admin(&SenderPermissions::new(&*server, sender)) {
            let message = self.formatter().format("admin-no-permission", &[]);
            server.send_message(&sender, message);
            return;
        }

        let Some(target) = server.find_player(target_name) else {
            let message = self
                .formatter()
                .format("player-not-found", &[("{player}", target_name)]);
            server.send_message(&sender, message);
            return;
        };
        let target_sender = Sender::Player(target);
        let plain_name = server.player_name(&target).unwrap_or_else(|| target_name.to_string());

        let color_arg = color_arg.to_lowercase();
        if color_arg == RESET_ARG {
            self.clear_color(server, &target);
            self.store().remove(&target);

            let message = self
                .formatter()
                .format("admin-color-reset", &[("{player}", plain_name.as_str())]);
            server.send_message(&sender, message);
            let message = self.formatter().format("admin-color-reset-target", &[]);
            server.send_message(&target_sender, message);
            return;
        }

        let Some(color) = NameColor::from_name(&color_arg) else {
            let list = colors::formatted_list(&NameColor::ALL);
            let message = self
                .formatter()
                .format("invalid-color-admin", &[("{colors}", list.as_str())]);
            server.send_message(&sender, message);
            return;
        };

        self.apply_color(server, &target, color);
        self.store().set(target, color.name());

        let painted = color.paint(color.name());
        let display = server.display_name(&target).unwrap_or_default();
        let message = self.formatter().format(
            "admin-color-changed",
            &[
                ("{player}", plain_name.as_str()),
                ("{color}", painted.as_str()),
                ("{name}", display.as_str()),
            ],
        );
        server.send_message(&sender, message);
        let message = self.formatter().format(
            "admin-color-changed-target",
            &[("{color}", painted.as_str()), ("{name}", display.as_str())],
        );
        server.send_message(&target_sender, message);
    }

    /// Suggestions for the argument being typed, filtered by prefix.
    pub fn on_tab_complete(&self, server: &dyn Server, sender: Sender, args: &[&str]) -> Vec<String> {
        let perms = SenderPermissions::new(server, sender);
        let is_admin = permissions::is_admin(&perms);

        let (candidates, typed) = match args {
            [typed] => {
                let mut candidates = Vec::new();
                if matches!(sender, Sender::Player(_)) {
                    candidates.extend(
                        permissions::available_colors(&perms)
                            .into_iter()
                            .map(|c| c.name().to_string()),
                    );
                    candidates.push(RESET_ARG.to_string());
                }
                candidates.push("help".to_string());
                candidates.push("list".to_string());
                if permissions::can_reload(&perms) {
                    candidates.push("reload".to_string());
                }
                if is_admin {
                    candidates.extend(
                        server
                            .online_players()
                            .iter()
                            .filter_map(|id| server.player_name(id)),
                    );
                }
                (candidates, *typed)
            }
            [_, typed] if is_admin => {
                let mut candidates: Vec<String> =
                    NameColor::ALL.iter().map(|c| c.name().to_string()).collect();
                candidates.push(RESET_ARG.to_string());
                (candidates, *typed)
            }
            _ => return Vec::new(),
        };

        let typed = typed.to_lowercase();
        candidates
            .into_iter()
            .filter(|c| c.to_lowercase().starts_with(&typed))
            .collect()
    }
}
