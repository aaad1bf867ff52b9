/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Tone used when the user has never picked one.
pub const DEFAULT_TONE: &str = "neutral and professional";

/// Which aspects of a message the model may rewrite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CorrectionMode {
    /// Grammar + spelling + tone/style (default).
    #[default]
    Full,
    /// Grammar/spelling/punctuation only; style and word choice untouched.
    GrammarOnly,
    /// Tone/style only; spelling and punctuation untouched.
    StyleOnly,
}

impl CorrectionMode {
    pub const ALL: [CorrectionMode; 3] = [
        CorrectionMode::Full,
        CorrectionMode::GrammarOnly,
        CorrectionMode::StyleOnly,
    ];

    /// Stable slug used in callback payloads.
    pub fn slug(&self) -> &'static str {
        match self {
            CorrectionMode::Full => "full",
            CorrectionMode::GrammarOnly => "grammar",
            CorrectionMode::StyleOnly => "style",
        }
    }

    pub fn from_slug(s: &str) -> Option<CorrectionMode> {
        Self::ALL.into_iter().find(|m| m.slug() == s)
    }

    /// Human label for menus and the settings view.
    pub fn label(&self) -> &'static str {
        match self {
            CorrectionMode::Full => "Full correction",
            CorrectionMode::GrammarOnly => "Grammar only",
            CorrectionMode::StyleOnly => "Style only",
        }
    }
}

/// Built-in tone presets. The expansion is what actually gets interpolated
/// into the prompt; the label is what the button shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TonePreset {
    Casual,
    Formal,
    Polite,
    Academic,
}

impl TonePreset {
    pub const ALL: [TonePreset; 4] = [
        TonePreset::Casual,
        TonePreset::Formal,
        TonePreset::Polite,
        TonePreset::Academic,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            TonePreset::Casual => "casual",
            TonePreset::Formal => "formal",
            TonePreset::Polite => "polite",
            TonePreset::Academic => "academic",
        }
    }

    pub fn from_slug(s: &str) -> Option<TonePreset> {
        Self::ALL.into_iter().find(|p| p.slug() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TonePreset::Casual => "Casual",
            TonePreset::Formal => "Formal",
            TonePreset::Polite => "Polite",
            TonePreset::Academic => "Academic",
        }
    }

    /// Descriptive phrase interpolated verbatim into the instruction.
    pub fn expansion(&self) -> &'static str {
        match self {
            TonePreset::Casual => "casual and conversational",
            TonePreset::Formal => "formal and business-like",
            TonePreset::Polite => "polite and respectful",
            TonePreset::Academic => {
                "academic and scholarly, highly intellectual and even pedantic"
            }
        }
    }
}
