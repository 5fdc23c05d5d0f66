//! The sixteen standard name colors and their legacy display codes.

use std::fmt;

/// Marker character that introduces a legacy formatting code.
pub const SECTION: char = '§';

/// Code that clears any active color.
pub const RESET: &str = "§r";

/// A color a player may pick for their name. Formatting codes (bold,
/// italic, ...) are deliberately not included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

impl NameColor {
    /// Every color, in code order.
    pub const ALL: [NameColor; 16] = [
        NameColor::Black,
        NameColor::DarkBlue,
        NameColor::DarkGreen,
        NameColor::DarkAqua,
        NameColor::DarkRed,
        NameColor::DarkPurple,
        NameColor::Gold,
        NameColor::Gray,
        NameColor::DarkGray,
        NameColor::Blue,
        NameColor::Green,
        NameColor::Aqua,
        NameColor::Red,
        NameColor::LightPurple,
        NameColor::Yellow,
        NameColor::White,
    ];

    /// Look a color up by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.name() == lower)
    }

    /// The lowercase name used in commands, permissions and the data file.
    pub const fn name(self) -> &'static str {
        match self {
            NameColor::Black => "black",
            NameColor::DarkBlue => "darkblue",
            NameColor::DarkGreen => "darkgreen",
            NameColor::DarkAqua => "darkaqua",
            NameColor::DarkRed => "darkred",
            NameColor::DarkPurple => "darkpurple",
            NameColor::Gold => "gold",
            NameColor::Gray => "gray",
            NameColor::DarkGray => "darkgray",
            NameColor::Blue => "blue",
            NameColor::Green => "green",
            NameColor::Aqua => "aqua",
            NameColor::Red => "red",
            NameColor::LightPurple => "lightpurple",
            NameColor::Yellow => "yellow",
            NameColor::White => "white",
        }
    }

    /// The single-character code following [`SECTION`].
    pub const fn code_char(self) -> char {
        match self {
            NameColor::Black => '0',
            NameColor::DarkBlue => '1',
            NameColor::DarkGreen => '2',
            NameColor::DarkAqua => '3',
            NameColor::DarkRed => '4',
            NameColor::DarkPurple => '5',
            NameColor::Gold => '6',
            NameColor::Gray => '7',
            NameColor::DarkGray => '8',
            NameColor::Blue => '9',
            NameColor::Green => 'a',
            NameColor::Aqua => 'b',
            NameColor::Red => 'c',
            NameColor::LightPurple => 'd',
            NameColor::Yellow => 'e',
            NameColor::White => 'f',
        }
    }

    /// `text` wrapped in this color and a trailing reset.
    pub fn paint(self, text: &str) -> String {
        format!("{self}{text}{RESET}")
    }
}

/// Displays as the color code, e.g. `§c` for red.
impl fmt::Display for NameColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SECTION}{}", self.code_char())
    }
}

/// Comma-separated list with each name painted in its own color.
pub fn formatted_list(colors: &[NameColor]) -> String {
    colors
        .iter()
        .map(|c| c.paint(c.name()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convert legacy codes to ANSI escapes for terminal output.
///
/// Unknown codes are dropped; formatting codes other than reset are ignored.
pub fn to_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != SECTION {
            out.push(c);
            continue;
        }
        let Some(code) = chars.next() else {
            break;
        };
        let code = code.to_ascii_lowercase();
        if code == 'r' {
            out.push_str("\x1b[0m");
        } else if let Some(color) = NameColor::ALL.into_iter().find(|c| c.code_char() == code) {
            out.push_str(ansi_sgr(color));
        }
    }
    out
}

fn ansi_sgr(color: NameColor) -> &'static str {
    match color {
        NameColor::Black => "\x1b[30m",
        NameColor::DarkBlue => "\x1b[34m",
        NameColor::DarkGreen => "\x1b[32m",
        NameColor::DarkAqua => "\x1b[36m",
        NameColor::DarkRed => "\x1b[31m",
        NameColor::DarkPurple => "\x1b[35m",
        NameColor::Gold => "\x1b[33m",
        NameColor::Gray => "\x1b[37m",
        NameColor::DarkGray => "\x1b[90m",
        NameColor::Blue => "\x1b[94m",
        NameColor::Green => "\x1b[92m",
        NameColor::Aqua => "\x1b[96m",
        NameColor::Red => "\x1b[91m",
        NameColor::LightPurple => "\x1b[95m",
        NameColor::Yellow => "\x1b[93m",
        NameColor::White => "\x1b[97m",
    }
}
