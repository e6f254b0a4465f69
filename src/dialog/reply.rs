//! Outbound replies rendered by the messaging channel

use super::ButtonAction;
use serde::{Deserialize, Serialize};

/// A message to show to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Keyboard>,
    /// Channel file id of an image to attach
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
            photo: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn with_photo(mut self, photo: Option<String>) -> Self {
        self.photo = photo;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Keyboard {
    /// Persistent reply keyboard of label rows
    Menu { rows: Vec<Vec<String>> },
    /// Buttons attached to a single message
    Inline { rows: Vec<Vec<InlineButton>> },
}

impl Keyboard {
    pub fn menu(rows: &[&[&str]]) -> Self {
        Keyboard::Menu {
            rows: rows
                .iter()
                .map(|row| row.iter().map(ToString::to_string).collect())
                .collect(),
        }
    }

    /// One button per row
    pub fn column(buttons: impl IntoIterator<Item = InlineButton>) -> Self {
        Keyboard::Inline {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }

    /// All buttons on a single row
    pub fn row(buttons: impl IntoIterator<Item = InlineButton>) -> Self {
        Keyboard::Inline {
            rows: vec![buttons.into_iter().collect()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub label: String,
    /// Wire form of a `ButtonAction`
    pub action: String,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, action: &ButtonAction) -> Self {
        Self {
            label: label.into(),
            action: action.encode(),
        }
    }
}
