//! Decoding transport updates into engine events.
//!
//! This is the only place raw token strings are interpreted; everything
//! past this boundary is typed. Updates the engine has no transition for
//! are dropped here, not errored.

use tracing::debug;

use cadenza_core::engine::{ChatEvent, FormatChoice, MenuAction, token};
use cadenza_core::session::{Language, UserId};
use cadenza_core::transport::{ChatId, InboundEvent};

use crate::api::Update;

/// Decodes one update into an engine event, or `None` when it carries
/// nothing the engine understands.
pub fn decode_update(update: &Update) -> Option<InboundEvent> {
    if let Some(message) = &update.message {
        let user = UserId(message.from.as_ref()?.id);
        let chat = ChatId(message.chat.id);
        let text = message.text.as_deref()?;
        let event = if is_start_command(text) {
            ChatEvent::Start
        } else if text.starts_with('/') {
            debug!(text, "dropping unknown command");
            return None;
        } else {
            ChatEvent::Text(text.to_string())
        };
        return Some(InboundEvent {
            user,
            chat,
            callback_id: None,
            event,
        });
    }

    if let Some(callback) = &update.callback_query {
        let chat = ChatId(callback.message.as_ref()?.chat.id);
        let event = decode_token(callback.data.as_deref()?)?;
        return Some(InboundEvent {
            user: UserId(callback.from.id),
            chat,
            callback_id: Some(callback.id.clone()),
            event,
        });
    }

    None
}

/// Parses one callback token from the closed vocabulary.
pub fn decode_token(data: &str) -> Option<ChatEvent> {
    if let Some(index) = data.strip_prefix(token::SELECT_PREFIX) {
        return index.parse().ok().map(ChatEvent::CandidatePicked);
    }
    match data {
        token::LANG_FR => Some(ChatEvent::LanguagePicked(Language::Fr)),
        token::LANG_EN => Some(ChatEvent::LanguagePicked(Language::En)),
        token::AUDIO => Some(ChatEvent::Menu(MenuAction::Audio)),
        token::VIDEO => Some(ChatEvent::Menu(MenuAction::Video)),
        token::HISTORY => Some(ChatEvent::Menu(MenuAction::History)),
        token::MENU => Some(ChatEvent::Menu(MenuAction::Menu)),
        token::BEST => Some(ChatEvent::QualityPicked(FormatChoice::Best)),
        token::P360 => Some(ChatEvent::QualityPicked(FormatChoice::P360)),
        token::P144 => Some(ChatEvent::QualityPicked(FormatChoice::P144)),
        token::BEST_AUDIO => Some(ChatEvent::QualityPicked(FormatChoice::BestAudio)),
        _ => {
            debug!(data, "dropping unknown callback token");
            None
        }
    }
}

/// `/start`, with or without the `@botname` suffix or trailing arguments.
fn is_start_command(text: &str) -> bool {
    let first = text.split_whitespace().next().unwrap_or("");
    first == "/start" || first.starts_with("/start@")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CallbackQuery, Chat, Message, User};

    fn message_update(text: &str) -> Update {
        Update {
            update_id: 1,
            message: Some(Message {
                message_id: 10,
                from: Some(User { id: 42 }),
                chat: Chat { id: 99 },
                text: Some(text.to_string()),
            }),
            callback_query: None,
        }
    }

    fn callback_update(data: &str) -> Update {
        Update {
            update_id: 2,
            message: None,
            callback_query: Some(CallbackQuery {
                id: "cb-1".into(),
                from: User { id: 42 },
                message: Some(Message {
                    message_id: 10,
                    from: None,
                    chat: Chat { id: 99 },
                    text: None,
                }),
                data: Some(data.to_string()),
            }),
        }
    }

    #[test]
    fn start_command_decodes_to_onboarding() {
        let inbound = decode_update(&message_update("/start")).unwrap();
        assert_eq!(inbound.user, UserId(42));
        assert_eq!(inbound.chat, ChatId(99));
        assert_eq!(inbound.event, ChatEvent::Start);
        assert!(inbound.callback_id.is_none());

        let inbound = decode_update(&message_update("/start@cadenza_bot")).unwrap();
        assert_eq!(inbound.event, ChatEvent::Start);
    }

    #[test]
    fn unknown_commands_are_dropped() {
        assert!(decode_update(&message_update("/help")).is_none());
        assert!(decode_update(&message_update("/startled")).is_none());
    }

    #[test]
    fn free_text_decodes_to_a_text_event() {
        let inbound = decode_update(&message_update("lofi beats")).unwrap();
        assert_eq!(inbound.event, ChatEvent::Text("lofi beats".into()));
    }

    #[test]
    fn callback_tokens_cover_the_whole_vocabulary() {
        let cases = [
            ("fr", ChatEvent::LanguagePicked(Language::Fr)),
            ("en", ChatEvent::LanguagePicked(Language::En)),
            ("audio", ChatEvent::Menu(MenuAction::Audio)),
            ("video", ChatEvent::Menu(MenuAction::Video)),
            ("history", ChatEvent::Menu(MenuAction::History)),
            ("menu", ChatEvent::Menu(MenuAction::Menu)),
            ("best", ChatEvent::QualityPicked(FormatChoice::Best)),
            ("360p", ChatEvent::QualityPicked(FormatChoice::P360)),
            ("144p", ChatEvent::QualityPicked(FormatChoice::P144)),
            ("bestaudio", ChatEvent::QualityPicked(FormatChoice::BestAudio)),
            ("select_0", ChatEvent::CandidatePicked(0)),
            ("select_9", ChatEvent::CandidatePicked(9)),
        ];
        for (data, expected) in cases {
            assert_eq!(decode_token(data), Some(expected), "token {data}");
        }
    }

    #[test]
    fn callback_press_carries_its_acknowledgement_id() {
        let inbound = decode_update(&callback_update("audio")).unwrap();
        assert_eq!(inbound.callback_id.as_deref(), Some("cb-1"));
    }

    #[test]
    fn unknown_or_malformed_tokens_are_dropped() {
        assert!(decode_token("select_").is_none());
        assert!(decode_token("select_x").is_none());
        assert!(decode_token("reboot").is_none());
        assert!(decode_update(&callback_update("reboot")).is_none());
    }

    #[test]
    fn updates_without_payload_are_dropped() {
        let update = Update {
            update_id: 3,
            message: None,
            callback_query: None,
        };
        assert!(decode_update(&update).is_none());
    }
}
