//! In-memory form of `playerdata.yml`.
//!
//! The document is kept as a generic YAML mapping rather than a typed struct
//! so that keys this crate does not know about (other top-level sections,
//! extra per-player fields) survive a load/save cycle untouched.
//!
//! Layout:
//!
//! ```yaml
//! players:
//!   0f8fad5b-d9cb-469f-a165-70867728950e:
//!     color: red
//! ```

use crate::error::{Result, StoreError};
use crate::user_id::UserId;
use serde_yaml_ng::{Mapping, Value};
use std::collections::HashMap;

/// Top-level section holding one entry per player.
pub const PLAYERS_KEY: &str = "players";
/// Per-player field holding the color name.
pub const COLOR_KEY: &str = "color";

/// Text encoding of a [`PlayerDocument`].
///
/// [`YamlFormat`] is the only production implementation; the trait exists so
/// the store's blank-output guard can be exercised with a misbehaving
/// renderer.
pub trait DocumentFormat: Send + Sync {
    /// Parse file contents into a YAML value.
    fn parse(&self, contents: &str) -> Result<Value>;

    /// Render a YAML value back to file contents.
    fn render(&self, value: &Value) -> Result<String>;
}

/// `serde_yaml_ng`-backed format.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlFormat;

impl DocumentFormat for YamlFormat {
    fn parse(&self, contents: &str) -> Result<Value> {
        serde_yaml_ng::from_str(contents).map_err(StoreError::Parse)
    }

    fn render(&self, value: &Value) -> Result<String> {
        serde_yaml_ng::to_string(value).map_err(StoreError::Render)
    }
}

/// The structured document mirrored to disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerDocument {
    root: Mapping,
}

impl PlayerDocument {
    /// An empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse file contents with `format`.
    ///
    /// Blank contents (a freshly created file) and a `null` document are both
    /// an empty document. A document whose root is not a mapping is an error.
    ///
    /// Player keys in any form a UUID parser accepts (uppercase, braced,
    /// unhyphenated) are rewritten to the canonical [`UserId`] string, so
    /// later updates and removals hit the same entry.
    pub fn parse(contents: &str, format: &dyn DocumentFormat) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::new());
        }
        match format.parse(contents)? {
            Value::Mapping(root) => {
                let mut document = Self { root };
                document.canonicalize_player_keys();
                Ok(document)
            }
            Value::Null => Ok(Self::new()),
            other => Err(StoreError::Parse(serde::de::Error::custom(format!(
                "expected a mapping at the document root, found {}",
                value_kind(&other)
            )))),
        }
    }

    /// Render the document with `format`.
    pub fn render(&self, format: &dyn DocumentFormat) -> Result<String> {
        format.render(&Value::Mapping(self.root.clone()))
    }

    /// Set `players.<id>.color`, keeping any other fields of that player.
    pub fn set_color(&mut self, id: &UserId, color: &str) {
        let entry = ensure_mapping(
            self.players_mut()
                .entry(Value::String(id.to_string()))
                .or_insert(Value::Null),
        );
        entry.insert(
            Value::String(COLOR_KEY.to_string()),
            Value::String(color.to_string()),
        );
    }

    /// Remove the whole `players.<id>` entry. Returns whether it existed.
    pub fn remove_player(&mut self, id: &UserId) -> bool {
        match self.root.get_mut(PLAYERS_KEY) {
            Some(Value::Mapping(players)) => players.remove(id.to_string().as_str()).is_some(),
            _ => false,
        }
    }

    /// Build the id → color cache from the `players` section.
    ///
    /// Keys that are not valid ids are logged and skipped. Entries without a
    /// string `color` field are skipped silently.
    pub fn colors(&self) -> HashMap<UserId, String> {
        let mut colors = HashMap::new();
        let Some(Value::Mapping(players)) = self.root.get(PLAYERS_KEY) else {
            return colors;
        };

        for (key, entry) in players {
            let Some(id) = parse_user_key(key) else {
                log::warn!("Invalid player id in player data: {}", describe_key(key));
                continue;
            };
            if let Some(color) = entry.get(COLOR_KEY).and_then(Value::as_str) {
                colors.insert(id, color.to_string());
            }
        }
        colors
    }

    /// Re-key `players` by canonical id. Invalid keys are left in place for
    /// [`PlayerDocument::colors`] to report. When two keys name the same
    /// player the later entry wins, as it does when building the cache.
    fn canonicalize_player_keys(&mut self) {
        let Some(Value::Mapping(players)) = self.root.get_mut(PLAYERS_KEY) else {
            return;
        };
        let needs_rewrite = players.keys().any(|key| {
            parse_user_key(key).is_some_and(|id| key.as_str() != Some(id.to_string().as_str()))
        });
        if !needs_rewrite {
            return;
        }

        let mut canonical = Mapping::with_capacity(players.len());
        for (key, entry) in std::mem::take(players) {
            let key = match parse_user_key(&key) {
                Some(id) => {
                    let id = Value::String(id.to_string());
                    if canonical.contains_key(&id) {
                        log::warn!(
                            "Duplicate player id in player data: {}; keeping the later entry",
                            describe_key(&key)
                        );
                    }
                    id
                }
                None => key,
            };
            canonical.insert(key, entry);
        }
        *players = canonical;
    }

    fn players_mut(&mut self) -> &mut Mapping {
        ensure_mapping(
            self.root
                .entry(Value::String(PLAYERS_KEY.to_string()))
                .or_insert(Value::Null),
        )
    }
}

/// Coerce `slot` into a mapping, replacing any scalar left there by hand edits.
fn ensure_mapping(slot: &mut Value) -> &mut Mapping {
    if !slot.is_mapping() {
        *slot = Value::Mapping(Mapping::new());
    }
    match slot {
        Value::Mapping(mapping) => mapping,
        _ => unreachable!("slot was just replaced with a mapping"),
    }
}

fn parse_user_key(key: &Value) -> Option<UserId> {
    key.as_str().and_then(|s| s.parse().ok())
}

fn describe_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml_ng::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| format!("{other:?}")),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
