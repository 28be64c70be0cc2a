//! Speech classification and text colors shared by channels and room chatter.

use serde::{Deserialize, Serialize};

/// How a line of speech reads, decided by its trailing punctuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextType {
    Statement,
    Question,
    Exclamation,
}

impl TextType {
    pub fn classify(text: &str) -> TextType {
        match text.trim_end().chars().last() {
            Some('?') => TextType::Question,
            Some('!') => TextType::Exclamation,
            _ => TextType::Statement,
        }
    }

    /// Second-person verb: "You ask".
    pub fn verb(&self) -> &'static str {
        match self {
            TextType::Statement => "say",
            TextType::Question => "ask",
            TextType::Exclamation => "exclaim",
        }
    }

    /// Third-person verb: "Aria asks".
    pub fn verb_third_person(&self) -> &'static str {
        match self {
            TextType::Statement => "says",
            TextType::Question => "asks",
            TextType::Exclamation => "exclaims",
        }
    }
}

pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Trim, capitalize and make sure the line ends in terminal punctuation.
pub fn punctuate(text: &str) -> String {
    let mut line = capitalize(text.trim());
    if line.is_empty() {
        return line;
    }
    if !line.ends_with(&['.', '!', '?'][..]) {
        line.push('.');
    }
    line
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    White,
    Gray,
    Yellow,
    Cyan,
    Magenta,
    Green,
    Red,
}

impl Color {
    pub fn hex(&self) -> &'static str {
        match self {
            Color::White => "#ffffff",
            Color::Gray => "#bebebe",
            Color::Yellow => "#f4d03f",
            Color::Cyan => "#48c9b0",
            Color::Magenta => "#c39bd3",
            Color::Green => "#58d68d",
            Color::Red => "#ec7063",
        }
    }

    /// Color used for a character's own lines.
    pub fn user_color() -> Color {
        Color::White
    }
}
