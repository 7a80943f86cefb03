//! Engine-level events and the callback-token vocabulary.
//!
//! Transport updates are decoded into [`ChatEvent`] exactly once, at the
//! transport boundary; the engine never sees raw token strings.

use crate::session::Language;

/// Actions reachable from the main menu keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Start an audio request.
    Audio,
    /// Start a video request.
    Video,
    /// Show the download history.
    History,
    /// Return to the main menu.
    Menu,
}

/// Quality/format choices offered before a download.
///
/// Audio mode offers a single target (MP3); video mode offers three tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatChoice {
    /// Best available quality.
    Best,
    /// At most 360p.
    P360,
    /// At most 144p.
    P144,
    /// Best available audio stream.
    BestAudio,
}

/// One conversation event for one user, already decoded and typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// The onboarding command (`/start`).
    Start,
    /// A language button press.
    LanguagePicked(Language),
    /// A main-menu button press.
    Menu(MenuAction),
    /// A positional pick from the last search results.
    CandidatePicked(usize),
    /// A quality button press.
    QualityPicked(FormatChoice),
    /// Free text: either a direct URL or a search query.
    Text(String),
}

/// The closed callback-token vocabulary shared with the transport layer.
///
/// Keyboards built by the engine carry these tokens; the transport decoder
/// parses them back. Anything outside this set is dropped at the boundary.
pub mod token {
    pub const LANG_FR: &str = "fr";
    pub const LANG_EN: &str = "en";
    pub const AUDIO: &str = "audio";
    pub const VIDEO: &str = "video";
    pub const HISTORY: &str = "history";
    pub const MENU: &str = "menu";
    pub const BEST: &str = "best";
    pub const P360: &str = "360p";
    pub const P144: &str = "144p";
    pub const BEST_AUDIO: &str = "bestaudio";
    pub const SELECT_PREFIX: &str = "select_";

    /// Builds the selection token for a result index.
    pub fn select(index: usize) -> String {
        format!("{SELECT_PREFIX}{index}")
    }
}

impl Language {
    pub fn token(&self) -> &'static str {
        match self {
            Language::Fr => token::LANG_FR,
            Language::En => token::LANG_EN,
        }
    }
}

impl FormatChoice {
    pub fn token(&self) -> &'static str {
        match self {
            FormatChoice::Best => token::BEST,
            FormatChoice::P360 => token::P360,
            FormatChoice::P144 => token::P144,
            FormatChoice::BestAudio => token::BEST_AUDIO,
        }
    }
}
