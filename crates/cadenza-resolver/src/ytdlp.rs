//! yt-dlp backed media resolver.
//!
//! Spawns the `yt-dlp` executable and parses its JSON output: search runs a
//! flat-playlist extraction over the `ytsearchN:` pseudo-URL (one JSON
//! object per line), downloads print a single JSON report describing the
//! fetched file. Every invocation is bounded by a timeout.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tokio::time;
use tracing::{debug, warn};

use cadenza_core::engine::FormatChoice;
use cadenza_core::error::{CadenzaError, Result};
use cadenza_core::resolver::{DownloadedMedia, MediaResolver};
use cadenza_core::session::{Candidate, MediaKind};

use crate::format::selector;
use crate::staging::output_template;

const DEFAULT_BINARY: &str = "yt-dlp";
const FALLBACK_TITLE: &str = "No title";

/// Resolver that shells out to `yt-dlp`.
pub struct YtDlpResolver {
    binary: PathBuf,
    staging_dir: PathBuf,
    timeout: Duration,
}

impl YtDlpResolver {
    /// Creates a resolver staging files under `staging_dir`, creating the
    /// directory if absent. `timeout` bounds every yt-dlp invocation.
    pub async fn new(staging_dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let staging_dir = staging_dir.into();
        tokio::fs::create_dir_all(&staging_dir).await?;
        Ok(Self {
            binary: PathBuf::from(DEFAULT_BINARY),
            staging_dir,
            timeout,
        })
    }

    /// Overrides the path to the yt-dlp executable.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Runs yt-dlp with `args`, mapping spawn failures, non-zero exits and
    /// timeouts through `fail`.
    async fn run(&self, args: &[String], fail: fn(String) -> CadenzaError) -> Result<Output> {
        debug!(?args, "invoking yt-dlp");
        let output = Command::new(&self.binary)
            .args(args)
            .kill_on_drop(true)
            .output();
        let output = time::timeout(self.timeout, output)
            .await
            .map_err(|_| fail(format!("yt-dlp timed out after {}s", self.timeout.as_secs())))?
            .map_err(|err| fail(format!("failed to run yt-dlp: {err}")))?;
        if !output.status.success() {
            return Err(fail(stderr_summary(&output.stderr)));
        }
        Ok(output)
    }
}

#[async_trait]
impl MediaResolver for YtDlpResolver {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Candidate>> {
        let args = vec![
            "--dump-json".to_string(),
            "--flat-playlist".to_string(),
            "--no-warnings".to_string(),
            "--no-check-certificates".to_string(),
            "--no-cache-dir".to_string(),
            format!("ytsearch{max_results}:{query}"),
        ];
        let output = self.run(&args, CadenzaError::Resolution).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        let mut candidates = Vec::new();
        for line in stdout.lines().filter(|line| !line.trim().is_empty()) {
            match serde_json::from_str::<SearchHit>(line) {
                Ok(hit) => {
                    if let Some(candidate) = hit.into_candidate() {
                        candidates.push(candidate);
                    }
                }
                Err(err) => warn!(error = %err, "skipping unreadable search hit"),
            }
            if candidates.len() == max_results {
                break;
            }
        }

        if candidates.is_empty() {
            return Err(CadenzaError::NoResults);
        }
        Ok(candidates)
    }

    async fn download(
        &self,
        url: &str,
        kind: MediaKind,
        format: FormatChoice,
    ) -> Result<DownloadedMedia> {
        let mut args = vec![
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--no-cache-dir".to_string(),
            "--restrict-filenames".to_string(),
            "--print-json".to_string(),
            "-f".to_string(),
            selector(kind, format).to_string(),
            "-o".to_string(),
            output_template(&self.staging_dir),
        ];
        match kind {
            MediaKind::Audio => args.extend([
                "-x".to_string(),
                "--audio-format".to_string(),
                "mp3".to_string(),
            ]),
            MediaKind::Video => args.extend([
                "--merge-output-format".to_string(),
                "mp4".to_string(),
            ]),
        }
        args.push(url.to_string());

        let output = self.run(&args, CadenzaError::Download).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout
            .lines()
            .rev()
            .find(|line| line.trim_start().starts_with('{'))
            .ok_or_else(|| CadenzaError::download("yt-dlp produced no download report"))?;
        let report: DownloadReport = serde_json::from_str(line)
            .map_err(|err| CadenzaError::download(format!("unreadable yt-dlp report: {err}")))?;

        report.into_media(url, kind)
    }
}

/// One line of `--dump-json --flat-playlist` output.
#[derive(Debug, Deserialize)]
struct SearchHit {
    title: Option<String>,
    url: Option<String>,
    webpage_url: Option<String>,
}

impl SearchHit {
    fn into_candidate(self) -> Option<Candidate> {
        let resolvable_url = self.webpage_url.or(self.url)?;
        Some(Candidate {
            title: self.title.unwrap_or_else(|| FALLBACK_TITLE.to_string()),
            resolvable_url,
        })
    }
}

/// The `--print-json` report of a completed download.
#[derive(Debug, Deserialize)]
struct DownloadReport {
    title: Option<String>,
    webpage_url: Option<String>,
    #[serde(rename = "_filename")]
    filename: Option<String>,
}

impl DownloadReport {
    fn into_media(self, requested_url: &str, kind: MediaKind) -> Result<DownloadedMedia> {
        let filename = self
            .filename
            .ok_or_else(|| CadenzaError::download("yt-dlp report lacks a file name"))?;
        let mut file_path = PathBuf::from(filename);
        if kind == MediaKind::Audio {
            // The extraction postprocessor renames the fetched file to .mp3.
            file_path.set_extension("mp3");
        }
        Ok(DownloadedMedia {
            file_path,
            title: self.title.unwrap_or_else(|| FALLBACK_TITLE.to_string()),
            canonical_url: self
                .webpage_url
                .unwrap_or_else(|| requested_url.to_string()),
        })
    }
}

/// Last non-empty stderr line, which is where yt-dlp puts its error.
fn stderr_summary(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    text.lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("yt-dlp failed without output")
        .trim()
        .to_string()
}
