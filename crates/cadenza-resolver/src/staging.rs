//! Staging-area output templates.
//!
//! All users share one staging directory, and downloads run concurrently.
//! Templates therefore embed a timestamp plus a process-wide sequence
//! number ahead of the title, so two downloads of the same media never
//! collide on a truncated title alone.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Builds a unique yt-dlp output template under `dir`.
///
/// The title placeholder is expanded by yt-dlp itself, capped at 50
/// characters; `--restrict-filenames` takes care of sanitization.
pub(crate) fn output_template(dir: &Path) -> String {
    let stamp = chrono::Utc::now().timestamp_millis();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}/{stamp}-{seq}-%(title).50s.%(ext)s", dir.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn templates_are_unique_across_calls() {
        let dir = PathBuf::from("downloads");
        let a = output_template(&dir);
        let b = output_template(&dir);
        assert_ne!(a, b);
    }

    #[test]
    fn template_lives_under_the_staging_dir_and_caps_the_title() {
        let dir = PathBuf::from("/tmp/staging");
        let template = output_template(&dir);
        assert!(template.starts_with("/tmp/staging/"));
        assert!(template.ends_with("-%(title).50s.%(ext)s"));
    }
}
