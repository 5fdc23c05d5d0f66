//! User-facing message templating.

use crate::colors::SECTION;
use crate::config::PluginConfig;

/// Codes accepted after an alternate color character.
const CODE_CHARS: &str = "0123456789AaBbCcDdEeFfKkLlMmNnOoRrXx";

/// Replace `alt` followed by a valid code character with [`SECTION`] and
/// the lowercased code. Anything else is left as is.
pub fn translate_color_codes(alt: char, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == alt
            && let Some(&next) = chars.peek()
            && CODE_CHARS.contains(next)
        {
            out.push(SECTION);
            out.push(next.to_ascii_lowercase());
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}

/// Builds prefixed messages from the configured templates.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    prefix: String,
    config: PluginConfig,
}

impl MessageFormatter {
    pub fn new(config: &PluginConfig) -> Self {
        Self {
            prefix: translate_color_codes(SECTION, &config.message_format.prefix),
            config: config.clone(),
        }
    }

    /// The translated chat prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `prefix + " " + messages.<key>`, with `&` codes translated and each
    /// `(placeholder, value)` pair substituted in order. Unknown keys yield
    /// just the prefix.
    pub fn format(&self, key: &str, replacements: &[(&str, &str)]) -> String {
        let template = self.config.messages.get(key).map(String::as_str).unwrap_or_default();
        if template.is_empty() {
            log::debug!("No message template for key '{key}'");
        }
        let mut message = format!("{} {}", self.prefix, translate_color_codes('&', template));
        for (placeholder, value) in replacements {
            message = message.replace(placeholder, value);
        }
        message
    }

    /// `help.<key>` with `§` codes normalised. Unknown keys yield "".
    pub fn help(&self, key: &str) -> String {
        self.config
            .help
            .get(key)
            .map(|line| translate_color_codes(SECTION, line))
            .unwrap_or_default()
    }
}
