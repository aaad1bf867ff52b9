use crate::domain::{CorrectionMode, TonePreset};

/// Inline keyboard (buttons) attached to an outgoing message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineKeyboard {
    /// One inner vec per row.
    pub rows: Vec<Vec<InlineButton>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineKeyboard {
    pub fn new(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }

    /// Convenience for "one button per row" layouts.
    pub fn one_per_row(buttons: Vec<InlineButton>) -> Self {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }
}

impl InlineButton {
    pub fn for_action(label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            callback_data: action.encode(),
        }
    }
}

/// Tagged menu actions carried in inline-button callback payloads.
///
/// Encoding/decoding lives here, at the wire boundary; the controller only
/// ever sees the decoded variant, never a raw string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    /// Show the tone menu (navigation only, no state change).
    OpenToneMenu,
    /// Show the mode menu (navigation only, no state change).
    OpenModeMenu,
    /// Adopt a preset tone's expansion.
    PresetTone(TonePreset),
    /// Start the free-text tone flow.
    CustomTone,
    /// Switch the correction mode.
    Mode(CorrectionMode),
    /// Re-run the last original text with current preferences.
    Reprocess,
    /// Dismiss the menu without touching state.
    Cancel,
}

impl MenuAction {
    pub fn encode(&self) -> String {
        match self {
            MenuAction::OpenToneMenu => "menu:tone".to_string(),
            MenuAction::OpenModeMenu => "menu:mode".to_string(),
            MenuAction::PresetTone(p) => format!("tone:{}", p.slug()),
            MenuAction::CustomTone => "tone:custom".to_string(),
            MenuAction::Mode(m) => format!("mode:{}", m.slug()),
            MenuAction::Reprocess => "redo".to_string(),
            MenuAction::Cancel => "cancel".to_string(),
        }
    }

    pub fn parse(data: &str) -> Option<MenuAction> {
        match data {
            "menu:tone" => return Some(MenuAction::OpenToneMenu),
            "menu:mode" => return Some(MenuAction::OpenModeMenu),
            "tone:custom" => return Some(MenuAction::CustomTone),
            "redo" => return Some(MenuAction::Reprocess),
            "cancel" => return Some(MenuAction::Cancel),
            _ => {}
        }

        if let Some(slug) = data.strip_prefix("tone:") {
            return TonePreset::from_slug(slug).map(MenuAction::PresetTone);
        }
        if let Some(slug) = data.strip_prefix("mode:") {
            return CorrectionMode::from_slug(slug).map(MenuAction::Mode);
        }
        None
    }
}
