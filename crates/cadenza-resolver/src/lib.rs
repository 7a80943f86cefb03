//! yt-dlp backed implementation of the cadenza media resolver contract.
//!
//! Everything network-facing lives behind the `yt-dlp` executable; this
//! crate only builds its command lines and parses its JSON output.

mod format;
mod staging;
mod ytdlp;

pub use ytdlp::YtDlpResolver;
