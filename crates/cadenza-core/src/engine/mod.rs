//! Conversation engine.
//!
//! Routes one decoded [`ChatEvent`] at a time through the user's session,
//! calling the media resolver where a transition needs it, and emits the
//! outgoing views. Resolver failures never escape: they are rendered as
//! localized replies and the session stays usable.
//!
//! Callers must apply same-user events in arrival order (the dispatcher
//! runs one worker per user); the engine itself holds no locks.

mod event;
mod reply;

pub use event::{ChatEvent, FormatChoice, MenuAction, token};
pub use reply::{Button, Keyboard, Reply, TextMarkup};

use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{CadenzaError, Result};
use crate::resolver::MediaResolver;
use crate::session::{Candidate, HistoryEntry, Language, MediaKind, Session, SessionStore, UserId};
use crate::text;

/// Candidate titles are cut to this length on selection buttons.
const BUTTON_TITLE_LEN: usize = 50;

/// The per-user conversation state machine.
pub struct ConversationEngine {
    store: Arc<dyn SessionStore>,
    resolver: Arc<dyn MediaResolver>,
    search_limit: usize,
}

impl ConversationEngine {
    /// Creates an engine over the given store and resolver.
    ///
    /// `search_limit` caps how many candidates a search returns and shows.
    pub fn new(
        store: Arc<dyn SessionStore>,
        resolver: Arc<dyn MediaResolver>,
        search_limit: usize,
    ) -> Self {
        Self {
            store,
            resolver,
            search_limit,
        }
    }

    /// Advances the user's conversation with one event and returns the
    /// replies to deliver, in order. An empty vector means the event was a
    /// no-op (e.g. a stale selection).
    ///
    /// # Errors
    ///
    /// Only session store failures escape; resolver failures are converted
    /// to localized replies here.
    pub async fn handle(&self, user: UserId, event: ChatEvent) -> Result<Vec<Reply>> {
        match event {
            ChatEvent::Start => self.on_start(user).await,
            ChatEvent::LanguagePicked(language) => self.on_language(user, language).await,
            ChatEvent::Menu(MenuAction::Menu) => {
                let session = self.store.get(user).await?;
                Ok(vec![main_menu_reply(session.language)])
            }
            ChatEvent::Menu(MenuAction::History) => {
                let session = self.store.get(user).await?;
                Ok(vec![Reply::markdown(text::render_history(
                    session.language,
                    &session.history,
                ))])
            }
            ChatEvent::Menu(MenuAction::Audio) => self.begin_mode(user, MediaKind::Audio).await,
            ChatEvent::Menu(MenuAction::Video) => self.begin_mode(user, MediaKind::Video).await,
            ChatEvent::Text(content) => self.on_text(user, content).await,
            ChatEvent::CandidatePicked(index) => self.on_candidate(user, index).await,
            ChatEvent::QualityPicked(choice) => self.on_quality(user, choice).await,
        }
    }

    /// First contact creates the session with defaults; `/start` on an
    /// existing session keeps its state.
    async fn on_start(&self, user: UserId) -> Result<Vec<Reply>> {
        self.store.update(user, Box::new(|_| {})).await?;
        Ok(vec![Reply::prompt(
            text::choose_language(),
            vec![
                vec![Button::new(text::BTN_FRENCH, Language::Fr.token())],
                vec![Button::new(text::BTN_ENGLISH, Language::En.token())],
            ],
        )])
    }

    /// Picking a language starts the conversation over, history included.
    async fn on_language(&self, user: UserId, language: Language) -> Result<Vec<Reply>> {
        self.store
            .put(user, Session::with_language(language))
            .await?;
        Ok(vec![main_menu_reply(language)])
    }

    async fn begin_mode(&self, user: UserId, kind: MediaKind) -> Result<Vec<Reply>> {
        let session = self
            .store
            .update(user, Box::new(move |s| s.begin_mode(kind)))
            .await?;
        let prompt = match kind {
            MediaKind::Audio => text::audio_query_prompt(session.language),
            MediaKind::Video => text::video_query_prompt(session.language),
        };
        Ok(vec![Reply::text(prompt)])
    }

    /// Free text is either a direct URL (skip straight to the quality
    /// prompt) or a search query.
    async fn on_text(&self, user: UserId, content: String) -> Result<Vec<Reply>> {
        let session = self
            .store
            .update(
                user,
                Box::new({
                    let query = content.clone();
                    move |s| s.pending_query = Some(query)
                }),
            )
            .await?;

        if is_direct_url(&content) {
            return Ok(vec![quality_prompt(session.language, session.mode)]);
        }

        match self.resolver.search(&content, self.search_limit).await {
            Ok(candidates) => {
                let candidates: Vec<Candidate> =
                    candidates.into_iter().take(self.search_limit).collect();
                if candidates.is_empty() {
                    return Ok(vec![Reply::text(text::no_results(session.language))]);
                }
                let keyboard = selection_keyboard(&candidates);
                self.store
                    .update(
                        user,
                        Box::new(move |s| s.search_results = Some(candidates)),
                    )
                    .await?;
                Ok(vec![Reply::prompt(
                    text::results_found(session.language),
                    keyboard,
                )])
            }
            Err(CadenzaError::NoResults) => {
                Ok(vec![Reply::text(text::no_results(session.language))])
            }
            Err(err) => {
                warn!(user = %user, error = %err, "media search failed");
                Ok(vec![Reply::text(text::search_failed(
                    session.language,
                    &err.to_string(),
                ))])
            }
        }
    }

    async fn on_candidate(&self, user: UserId, index: usize) -> Result<Vec<Reply>> {
        let mut session = self.store.get(user).await?;
        if session.select_candidate(index).is_err() {
            // Stale or out-of-range pick, e.g. a button from a superseded
            // search. Ignore without replying.
            debug!(user = %user, index, "ignoring stale selection");
            return Ok(Vec::new());
        }
        self.store.put(user, session.clone()).await?;
        Ok(vec![quality_prompt(session.language, session.mode)])
    }

    async fn on_quality(&self, user: UserId, choice: FormatChoice) -> Result<Vec<Reply>> {
        let session = self.store.get(user).await?;
        let (Some(query), Some(kind)) = (session.pending_query.clone(), session.mode) else {
            // A quality press is only meaningful with a pending query and a
            // chosen mode.
            debug!(user = %user, "ignoring quality choice without a pending request");
            return Ok(Vec::new());
        };

        match self.resolver.download(&query, kind, choice).await {
            Ok(media) => {
                let entry = HistoryEntry {
                    title: media.title,
                    source_url: media.canonical_url,
                    kind,
                };
                self.store
                    .update(user, Box::new(move |s| s.record_download(entry)))
                    .await?;
                Ok(vec![Reply::Media {
                    path: media.file_path,
                    kind,
                }])
            }
            Err(err) => {
                warn!(user = %user, error = %err, "download failed");
                Ok(vec![Reply::text(text::download_failed(
                    session.language,
                    &err.to_string(),
                ))])
            }
        }
    }
}

fn is_direct_url(content: &str) -> bool {
    content.starts_with("http://") || content.starts_with("https://")
}

fn main_menu_reply(language: Language) -> Reply {
    Reply::prompt(
        text::main_menu(language),
        vec![
            vec![Button::new(text::BTN_AUDIO, token::AUDIO)],
            vec![Button::new(text::BTN_VIDEO, token::VIDEO)],
            vec![Button::new(text::BTN_HISTORY, token::HISTORY)],
        ],
    )
}

fn selection_keyboard(candidates: &[Candidate]) -> Keyboard {
    let mut rows: Keyboard = candidates
        .iter()
        .enumerate()
        .map(|(i, candidate)| {
            vec![Button::new(
                format!("{}. {}", i + 1, truncate_title(&candidate.title)),
                token::select(i),
            )]
        })
        .collect();
    rows.push(vec![Button::new(text::BTN_BACK_TO_MENU, token::MENU)]);
    rows
}

/// Mode may still be unset when a direct URL arrives before any menu pick;
/// the video tiers are offered then.
fn quality_prompt(language: Language, mode: Option<MediaKind>) -> Reply {
    let mut rows: Keyboard = match mode {
        Some(MediaKind::Audio) => vec![vec![Button::new(
            text::BTN_MP3,
            FormatChoice::BestAudio.token(),
        )]],
        _ => vec![vec![
            Button::new(text::BTN_BEST, FormatChoice::Best.token()),
            Button::new(text::BTN_360P, FormatChoice::P360.token()),
            Button::new(text::BTN_144P, FormatChoice::P144.token()),
        ]],
    };
    rows.push(vec![Button::new(text::BTN_BACK_TO_MENU, token::MENU)]);
    Reply::prompt(text::choose_quality(language), rows)
}

fn truncate_title(title: &str) -> String {
    title.chars().take(BUTTON_TITLE_LEN).collect()
}
