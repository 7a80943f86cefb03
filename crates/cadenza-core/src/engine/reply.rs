//! Outgoing views produced by the conversation engine.

use std::path::PathBuf;

use crate::session::MediaKind;

/// A labeled choice button carrying an opaque callback token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub token: String,
}

impl Button {
    pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }
}

/// Rows of buttons attached to a prompt.
pub type Keyboard = Vec<Vec<Button>>;

/// How a prompt's text should be interpreted by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMarkup {
    Plain,
    /// Link-style markup, used by the history rendering.
    Markdown,
}

/// One outgoing view. The transport renders it into whatever its message
/// and attachment primitives are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A text prompt with optional choice buttons.
    Prompt {
        text: String,
        markup: TextMarkup,
        keyboard: Keyboard,
    },
    /// A downloaded file to deliver, tagged with the kind that picks the
    /// delivery representation (playable document vs streamable clip).
    Media { path: PathBuf, kind: MediaKind },
}

impl Reply {
    /// A plain text reply without buttons.
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Prompt {
            text: text.into(),
            markup: TextMarkup::Plain,
            keyboard: Vec::new(),
        }
    }

    /// A markdown reply without buttons.
    pub fn markdown(text: impl Into<String>) -> Self {
        Reply::Prompt {
            text: text.into(),
            markup: TextMarkup::Markdown,
            keyboard: Vec::new(),
        }
    }

    /// A plain text prompt with a keyboard.
    pub fn prompt(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Reply::Prompt {
            text: text.into(),
            markup: TextMarkup::Plain,
            keyboard,
        }
    }
}
