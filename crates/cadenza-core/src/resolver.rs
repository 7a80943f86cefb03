//! Media resolver contract.
//!
//! The engine treats resolution as a black box with two operations: search
//! a text query into candidates, and turn a resolvable reference into a
//! downloaded file. Network fetch, format negotiation and transcoding all
//! live behind this trait.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::engine::FormatChoice;
use crate::error::Result;
use crate::session::{Candidate, MediaKind};

/// A downloaded file plus the metadata reported by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedMedia {
    /// Where the file landed in the staging directory.
    pub file_path: PathBuf,
    /// Resolver-reported title.
    pub title: String,
    /// Canonical source URL of the media.
    pub canonical_url: String,
}

/// Capability to search for media and fetch it.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Searches `query` and returns up to `max_results` ranked candidates.
    ///
    /// # Errors
    ///
    /// - [`CadenzaError::NoResults`] when the search matched nothing
    /// - [`CadenzaError::Resolution`] when the search itself failed
    ///
    /// [`CadenzaError::NoResults`]: crate::error::CadenzaError::NoResults
    /// [`CadenzaError::Resolution`]: crate::error::CadenzaError::Resolution
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Candidate>>;

    /// Resolves `url` into a downloaded file under the requested kind and
    /// format constraint.
    ///
    /// # Errors
    ///
    /// [`CadenzaError::Download`] for any fetch, negotiation or write
    /// failure, including timeouts.
    ///
    /// [`CadenzaError::Download`]: crate::error::CadenzaError::Download
    async fn download(
        &self,
        url: &str,
        kind: MediaKind,
        format: FormatChoice,
    ) -> Result<DownloadedMedia>;
}
