//! ANSI styling for console output.
//!
//! [`style`] is a pure function: it wraps text in the escape codes of the given
//! styles and appends a reset. Which styles are used for which role lives in a
//! [`Theme`] value that callers pass around explicitly.

use serde::{Deserialize, Serialize};

/// ANSI escape sequence that clears all styles.
pub const RESET: &str = "\x1b[0m";

/// A single ANSI color or text attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Red,
    Green,
    Yellow,
    Blue,
    Purple,
    Cyan,
    White,
    Bold,
    Underline,
}

impl Style {
    /// The escape sequence that turns this style on.
    pub fn code(&self) -> &'static str {
        match self {
            Style::Red => "\x1b[31m",
            Style::Green => "\x1b[32m",
            Style::Yellow => "\x1b[33m",
            Style::Blue => "\x1b[34m",
            Style::Purple => "\x1b[35m",
            Style::Cyan => "\x1b[36m",
            Style::White => "\x1b[37m",
            Style::Bold => "\x1b[1m",
            Style::Underline => "\x1b[4m",
        }
    }
}

/// Wrap `text` with every style in `styles`, followed by [`RESET`].
///
/// The reset is appended even when `styles` is empty.
pub fn style(text: &str, styles: &[Style]) -> String {
    let mut out = String::with_capacity(text.len() + styles.len() * 5 + RESET.len());
    for s in styles {
        out.push_str(s.code());
    }
    out.push_str(text);
    out.push_str(RESET);
    out
}

/// Remove ANSI SGR sequences (`ESC [ ... m`) from `text`.
pub fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Output roles a [`Theme`] assigns styles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Usage,
    Alias,
    Description,
    Error,
    Info,
    Tip,
    Prompt,
    Heading,
}

/// Styles per output role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// When false, [`Theme::paint`] returns text untouched.
    pub enabled: bool,
    pub usage: Vec<Style>,
    pub alias: Vec<Style>,
    pub description: Vec<Style>,
    pub error: Vec<Style>,
    pub info: Vec<Style>,
    pub tip: Vec<Style>,
    pub prompt: Vec<Style>,
    pub heading: Vec<Style>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            enabled: true,
            usage: vec![Style::Cyan],
            alias: vec![Style::Blue],
            description: vec![Style::Yellow],
            error: vec![Style::Red],
            info: vec![Style::Green],
            tip: vec![Style::Yellow],
            prompt: vec![Style::Purple],
            heading: vec![Style::Bold],
        }
    }
}

impl Theme {
    /// A theme that never emits escape codes.
    pub fn plain() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn styles(&self, role: Role) -> &[Style] {
        match role {
            Role::Usage => &self.usage,
            Role::Alias => &self.alias,
            Role::Description => &self.description,
            Role::Error => &self.error,
            Role::Info => &self.info,
            Role::Tip => &self.tip,
            Role::Prompt => &self.prompt,
            Role::Heading => &self.heading,
        }
    }

    /// Style `text` for `role`.
    pub fn paint(&self, text: &str, role: Role) -> String {
        if !self.enabled {
            return text.to_string();
        }
        style(text, self.styles(role))
    }

    /// Style `text` for `role` with extra attributes, e.g. bold usage lines.
    pub fn paint_with(&self, text: &str, role: Role, extra: &[Style]) -> String {
        if !self.enabled {
            return text.to_string();
        }
        let mut styles = self.styles(role).to_vec();
        styles.extend_from_slice(extra);
        style(text, &styles)
    }
}
