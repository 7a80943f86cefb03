//! yt-dlp format selector strings.

use cadenza_core::engine::FormatChoice;
use cadenza_core::session::MediaKind;

/// Maps a quality choice to a yt-dlp `-f` selector.
///
/// Video tiers request an mp4 video + m4a audio pair for broad playback
/// compatibility and fall back to the best single mp4 file when that pair
/// is unavailable. Audio always takes the best audio stream; the MP3
/// target is produced by the extraction step, not the selector.
pub(crate) fn selector(kind: MediaKind, choice: FormatChoice) -> &'static str {
    if kind == MediaKind::Audio {
        return "bestaudio";
    }
    match choice {
        FormatChoice::Best => "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]",
        FormatChoice::P360 => {
            "bestvideo[height<=360][ext=mp4]+bestaudio[ext=m4a]/best[height<=360][ext=mp4]"
        }
        FormatChoice::P144 => {
            "bestvideo[height<=144][ext=mp4]+bestaudio[ext=m4a]/best[height<=144][ext=mp4]"
        }
        FormatChoice::BestAudio => "bestaudio",
    }
}
