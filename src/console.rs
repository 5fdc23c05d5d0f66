//! A line-driven stand-in for a game server.
//!
//! Keeps an in-memory session list with operator flags and permission nodes,
//! implements [`Server`] for the plugin, and interprets simple console
//! commands so the whole system can be exercised from a terminal.

use crate::colors;
use crate::host::{Sender, Server};
use crate::plugin::NameColorPlugin;
use anyhow::Result;
use namecolor_store::UserId;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{BufRead, Write};

/// Commands understood by [`run_console`].
pub const CONSOLE_HELP: &str = "\
join <name>                 connect a player
leave <name>                disconnect a player
op <name> | deop <name>     toggle operator status
grant <name> <node>         add a permission node
revoke <name> <node>        remove a permission node
as <name> <args...>         run /namecolor as a player
console <args...>           run /namecolor as the console
tab <name> <args...>        tab-complete /namecolor as a player
who                         list online players and their names
stop                        save and shut down";

/// An online player tracked by [`ConsoleServer`].
#[derive(Debug, Clone)]
pub struct OnlinePlayer {
    pub id: UserId,
    pub name: String,
    pub display_name: String,
    pub list_name: String,
    pub op: bool,
    pub permissions: BTreeSet<String>,
}

/// In-memory session list plus an outbox of delivered chat lines.
#[derive(Debug, Default)]
pub struct ConsoleServer {
    players: BTreeMap<UserId, OnlinePlayer>,
    outbox: Vec<(Sender, String)>,
}

impl ConsoleServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect `name`. Ids are derived from the name, so reconnecting keeps
    /// the same identity. Returns the id of the (possibly already online)
    /// player.
    pub fn connect(&mut self, name: &str) -> UserId {
        let id = UserId::from_name(&name.to_lowercase());
        self.players.entry(id).or_insert_with(|| OnlinePlayer {
            id,
            name: name.to_string(),
            display_name: name.to_string(),
            list_name: name.to_string(),
            op: false,
            permissions: BTreeSet::new(),
        });
        id
    }

    pub fn disconnect(&mut self, id: &UserId) -> Option<OnlinePlayer> {
        self.players.remove(id)
    }

    pub fn player(&self, id: &UserId) -> Option<&OnlinePlayer> {
        self.players.get(id)
    }

    pub fn player_mut(&mut self, id: &UserId) -> Option<&mut OnlinePlayer> {
        self.players.get_mut(id)
    }

    pub fn players(&self) -> impl Iterator<Item = &OnlinePlayer> {
        self.players.values()
    }

    /// Take every message delivered since the last call.
    pub fn drain_messages(&mut self) -> Vec<(Sender, String)> {
        std::mem::take(&mut self.outbox)
    }
}

impl Server for ConsoleServer {
    fn online_players(&self) -> Vec<UserId> {
        self.players.keys().copied().collect()
    }

    fn find_player(&self, name: &str) -> Option<UserId> {
        self.players
            .values()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.id)
    }

    fn player_name(&self, id: &UserId) -> Option<String> {
        self.players.get(id).map(|p| p.name.clone())
    }

    fn display_name(&self, id: &UserId) -> Option<String> {
        self.players.get(id).map(|p| p.display_name.clone())
    }

    fn set_display_name(&mut self, id: &UserId, name: String) {
        if let Some(player) = self.players.get_mut(id) {
            player.display_name = name;
        }
    }

    fn set_list_name(&mut self, id: &UserId, name: String) {
        if let Some(player) = self.players.get_mut(id) {
            player.list_name = name;
        }
    }

    fn is_op(&self, sender: &Sender) -> bool {
        match sender {
            Sender::Console => true,
            Sender::Player(id) => self.players.get(id).is_some_and(|p| p.op),
        }
    }

    fn has_permission(&self, sender: &Sender, node: &str) -> bool {
        match sender {
            Sender::Console => true,
            Sender::Player(id) => self
                .players
                .get(id)
                .is_some_and(|p| p.permissions.contains(node)),
        }
    }

    fn send_message(&mut self, to: &Sender, message: String) {
        self.outbox.push((*to, message));
    }
}

/// Read console commands from `input` until `stop` or end of input,
/// writing chat and status lines to `output`.
///
/// Does not disable the plugin; the caller owns shutdown.
pub fn run_console(
    plugin: &mut NameColorPlugin,
    server: &mut ConsoleServer,
    input: impl BufRead,
    mut output: impl Write,
    ansi: bool,
) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&verb, rest)) = words.split_first() else {
            continue;
        };

        match (verb.to_lowercase().as_str(), rest) {
            ("stop", _) => break,
            ("help", _) => writeln!(output, "{CONSOLE_HELP}")?,
            ("join", [name]) => {
                let id = server.connect(name);
                plugin.on_join(server, &id);
                writeln!(output, "{name} joined ({id})")?;
            }
            ("leave", [name]) => match server.find_player(name) {
                Some(id) => {
                    server.disconnect(&id);
                    writeln!(output, "{name} left")?;
                }
                None => writeln!(output, "{name} is not online")?,
            },
            ("op" | "deop", [name]) => {
                let op = verb.eq_ignore_ascii_case("op");
                match server.find_player(name).and_then(|id| server.player_mut(&id)) {
                    Some(player) => {
                        player.op = op;
                        writeln!(output, "{} op: {op}", player.name)?;
                    }
                    None => writeln!(output, "{name} is not online")?,
                }
            }
            ("grant" | "revoke", [name, node]) => {
                let grant = verb.eq_ignore_ascii_case("grant");
                match server.find_player(name).and_then(|id| server.player_mut(&id)) {
                    Some(player) => {
                        if grant {
                            player.permissions.insert(node.to_string());
                        } else {
                            player.permissions.remove(*node);
                        }
                        writeln!(output, "{} permissions: {:?}", player.name, player.permissions)?;
                    }
                    None => writeln!(output, "{name} is not online")?,
                }
            }
            ("as", [name, args @ ..]) => match server.find_player(name) {
                Some(id) => plugin.on_command(server, Sender::Player(id), args),
                None => writeln!(output, "{name} is not online")?,
            },
            ("console", args) => plugin.on_command(server, Sender::Console, args),
            ("tab", [name, args @ ..]) => match server.find_player(name) {
                Some(id) => {
                    let suggestions = plugin.on_tab_complete(server, Sender::Player(id), args);
                    writeln!(output, "{}", suggestions.join(" "))?;
                }
                None => writeln!(output, "{name} is not online")?,
            },
            ("who", _) => {
                for player in server.players() {
                    writeln!(
                        output,
                        "{} chat={} list={}{}",
                        player.name,
                        render(&player.display_name, ansi),
                        render(&player.list_name, ansi),
                        if player.op { " [op]" } else { "" }
                    )?;
                }
            }
            _ => writeln!(output, "Unknown command: {line} (try 'help')")?,
        }

        for (to, message) in server.drain_messages() {
            let to = match to {
                Sender::Console => "console".to_string(),
                Sender::Player(id) => server.player_name(&id).unwrap_or_else(|| id.to_string()),
            };
            writeln!(output, "[to {to}] {}", render(&message, ansi))?;
        }
        output.flush()?;
    }
    Ok(())
}

fn render(text: &str, ansi: bool) -> String {
    if ansi {
        colors::to_ansi(text)
    } else {
        text.to_string()
    }
}
