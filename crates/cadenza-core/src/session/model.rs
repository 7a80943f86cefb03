//! Session domain model.
//!
//! This module contains the per-user conversation state that the engine
//! reads and advances on every incoming event.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CadenzaError, Result};

/// Opaque per-user identity assigned by the chat transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User interface language, picked once at onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// French (the fallback when nothing has been picked yet).
    #[default]
    Fr,
    /// English.
    En,
}

/// The content type a download request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single search hit: a display title plus a reference the resolver can
/// turn into a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub resolvable_url: String,
}

/// A record of one completed download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub title: String,
    pub source_url: String,
    pub kind: MediaKind,
}

/// Per-user conversation state.
///
/// The conversation "state machine" is derived from which of these fields
/// are set, not stored as a separate tag:
/// - no `mode`, no `pending_query`: main menu
/// - `mode` set, nothing pending: awaiting a query
/// - `search_results` set: awaiting a selection
/// - `pending_query` set: awaiting a quality choice
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Session {
    /// Interface language; persists until changed.
    pub language: Language,
    /// Content type of the request in progress, if any.
    pub mode: Option<MediaKind>,
    /// The last free-text query, URL, or selected candidate URL. Consumed
    /// when a quality choice completes.
    pub pending_query: Option<String>,
    /// Results of the last search; superseded by the next search.
    pub search_results: Option<Vec<Candidate>>,
    /// Completed downloads, in completion order. Append-only.
    pub history: Vec<HistoryEntry>,
}

impl Session {
    /// Creates a fresh session speaking the given language.
    pub fn with_language(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    /// Switches the requested content type and drops search state left over
    /// from a previous request.
    pub fn begin_mode(&mut self, kind: MediaKind) {
        self.mode = Some(kind);
        self.pending_query = None;
        self.search_results = None;
    }

    /// Resolves a positional pick against the current search results.
    ///
    /// On a valid index the candidate's URL becomes the pending query. A
    /// stale or out-of-range index leaves the session untouched and
    /// returns [`CadenzaError::InvalidSelection`].
    pub fn select_candidate(&mut self, index: usize) -> Result<()> {
        let url = self
            .search_results
            .as_ref()
            .and_then(|results| results.get(index))
            .map(|candidate| candidate.resolvable_url.clone())
            .ok_or(CadenzaError::InvalidSelection)?;
        self.pending_query = Some(url);
        Ok(())
    }

    /// Records a completed download and consumes the request state.
    pub fn record_download(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
        self.pending_query = None;
        self.search_results = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<Candidate> {
        vec![
            Candidate {
                title: "First".into(),
                resolvable_url: "https://example.com/1".into(),
            },
            Candidate {
                title: "Second".into(),
                resolvable_url: "https://example.com/2".into(),
            },
        ]
    }

    #[test]
    fn default_session_speaks_french_with_empty_history() {
        let session = Session::default();
        assert_eq!(session.language, Language::Fr);
        assert!(session.history.is_empty());
        assert!(session.mode.is_none());
    }

    #[test]
    fn begin_mode_clears_previous_search_state() {
        let mut session = Session::default();
        session.pending_query = Some("old query".into());
        session.search_results = Some(candidates());

        session.begin_mode(MediaKind::Audio);

        assert_eq!(session.mode, Some(MediaKind::Audio));
        assert!(session.pending_query.is_none());
        assert!(session.search_results.is_none());
    }

    #[test]
    fn select_candidate_sets_pending_query_to_chosen_url() {
        let mut session = Session::default();
        session.search_results = Some(candidates());

        assert!(session.select_candidate(1).is_ok());
        assert_eq!(
            session.pending_query.as_deref(),
            Some("https://example.com/2")
        );
    }

    #[test]
    fn select_candidate_out_of_range_is_a_noop() {
        let mut session = Session::default();
        session.search_results = Some(candidates());

        assert!(matches!(
            session.select_candidate(2),
            Err(CadenzaError::InvalidSelection)
        ));
        assert!(session.pending_query.is_none());
    }

    #[test]
    fn select_candidate_without_results_is_a_noop() {
        let mut session = Session::default();
        assert!(session.select_candidate(0).is_err());
        assert_eq!(session, Session::default());
    }

    #[test]
    fn record_download_appends_and_consumes_request_state() {
        let mut session = Session::default();
        session.mode = Some(MediaKind::Video);
        session.pending_query = Some("https://example.com/1".into());
        session.search_results = Some(candidates());

        session.record_download(HistoryEntry {
            title: "First".into(),
            source_url: "https://example.com/1".into(),
            kind: MediaKind::Video,
        });

        assert_eq!(session.history.len(), 1);
        assert_eq!(session.history[0].kind, MediaKind::Video);
        assert!(session.pending_query.is_none());
        assert!(session.search_results.is_none());
        // Mode survives so a follow-up query reuses it.
        assert_eq!(session.mode, Some(MediaKind::Video));
    }
}
