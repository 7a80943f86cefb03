//! User-facing strings, French and English.
//!
//! Every prompt has fr/en variants selected by the session language; the
//! fallback is French. Button labels are fixed strings shared by both
//! languages.

use crate::session::{HistoryEntry, Language};

pub const BTN_FRENCH: &str = "🇫🇷 Français";
pub const BTN_ENGLISH: &str = "🇬🇧 English";
pub const BTN_AUDIO: &str = "🎵 Audio";
pub const BTN_VIDEO: &str = "🎥 Vidéo";
pub const BTN_HISTORY: &str = "📜 Historique";
pub const BTN_BACK_TO_MENU: &str = "⬅️ Menu";
pub const BTN_MP3: &str = "MP3";
pub const BTN_BEST: &str = "Best";
pub const BTN_360P: &str = "360p";
pub const BTN_144P: &str = "144p";

/// Onboarding prompt, shown before any language is known.
pub fn choose_language() -> &'static str {
    "Choisissez votre langue / Choose your language :"
}

pub fn main_menu(lang: Language) -> &'static str {
    match lang {
        Language::Fr => "Que voulez-vous faire ?",
        Language::En => "What would you like to do?",
    }
}

pub fn audio_query_prompt(lang: Language) -> &'static str {
    match lang {
        Language::Fr => "Entrez le titre ou l’artiste 🎶 :",
        Language::En => "Enter title or artist 🎶:",
    }
}

pub fn video_query_prompt(lang: Language) -> &'static str {
    match lang {
        Language::Fr => "Entrez le lien, titre ou nom de vidéo 🎬 :",
        Language::En => "Enter link, title or name 🎬:",
    }
}

pub fn results_found(lang: Language) -> &'static str {
    match lang {
        Language::Fr => "Résultats trouvés : choisissez la vidéo :",
        Language::En => "Results found: choose the video:",
    }
}

pub fn no_results(lang: Language) -> &'static str {
    match lang {
        Language::Fr => "Aucun résultat trouvé pour cette recherche.",
        Language::En => "No results found for this search.",
    }
}

pub fn choose_quality(lang: Language) -> &'static str {
    match lang {
        Language::Fr => "Choisissez la qualité :",
        Language::En => "Choose quality:",
    }
}

pub fn no_downloads_yet(lang: Language) -> &'static str {
    match lang {
        Language::Fr => "Aucun téléchargement pour le moment.",
        Language::En => "No downloads yet.",
    }
}

pub fn search_failed(lang: Language, reason: &str) -> String {
    match lang {
        Language::Fr => format!("Erreur lors de la recherche : {reason}"),
        Language::En => format!("Search error: {reason}"),
    }
}

pub fn download_failed(lang: Language, reason: &str) -> String {
    match lang {
        Language::Fr => format!("Erreur : {reason}"),
        Language::En => format!("Error: {reason}"),
    }
}

/// Renders the download history, one link-style line per entry in
/// insertion order, or the localized empty message.
pub fn render_history(lang: Language, history: &[HistoryEntry]) -> String {
    if history.is_empty() {
        return no_downloads_yet(lang).to_string();
    }
    history
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                "{}. [{}]({}) ({})",
                i + 1,
                entry.title,
                entry.source_url,
                entry.kind
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
