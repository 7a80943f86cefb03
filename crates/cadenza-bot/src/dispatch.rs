//! Per-user serialized event dispatch.
//!
//! Events for different users run concurrently. Events for one user are
//! funneled through that user's worker task, so they apply in arrival
//! order even while an earlier download is still in flight. There is no
//! global lock across users.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{error, warn};

use cadenza_core::engine::ConversationEngine;
use cadenza_core::session::UserId;
use cadenza_core::transport::{InboundEvent, ReplySink};

/// Routes decoded events to per-user workers.
pub struct Dispatcher {
    engine: Arc<ConversationEngine>,
    sink: Arc<dyn ReplySink>,
    workers: Mutex<HashMap<UserId, mpsc::UnboundedSender<InboundEvent>>>,
}

impl Dispatcher {
    pub fn new(engine: Arc<ConversationEngine>, sink: Arc<dyn ReplySink>) -> Self {
        Self {
            engine,
            sink,
            workers: Mutex::new(HashMap::new()),
        }
    }

    /// Hands one event to its user's worker, spawning the worker on first
    /// contact. Enqueue order is arrival order.
    pub async fn dispatch(&self, inbound: InboundEvent) {
        let user = inbound.user;
        let mut workers = self.workers.lock().await;
        let sender = workers.entry(user).or_insert_with(|| self.spawn_worker());
        if let Err(mpsc::error::SendError(inbound)) = sender.send(inbound) {
            // The previous worker is gone (its task panicked); replace it
            // and replay the event.
            warn!(user = %user, "respawning session worker");
            let sender = self.spawn_worker();
            let _ = sender.send(inbound);
            workers.insert(user, sender);
        }
    }

    fn spawn_worker(&self) -> mpsc::UnboundedSender<InboundEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(self.engine.clone(), self.sink.clone(), rx));
        tx
    }
}

async fn run_worker(
    engine: Arc<ConversationEngine>,
    sink: Arc<dyn ReplySink>,
    mut events: mpsc::UnboundedReceiver<InboundEvent>,
) {
    while let Some(inbound) = events.recv().await {
        handle_event(&engine, sink.as_ref(), inbound).await;
    }
}

/// One full event cycle: acknowledge, advance the engine, deliver.
///
/// Every failure is logged and contained; one user's error never reaches
/// another session or takes the process down.
async fn handle_event(engine: &ConversationEngine, sink: &dyn ReplySink, inbound: InboundEvent) {
    if let Some(callback_id) = &inbound.callback_id {
        if let Err(err) = sink.ack(callback_id).await {
            warn!(user = %inbound.user, error = %err, "callback ack failed");
        }
    }

    match engine.handle(inbound.user, inbound.event).await {
        Ok(replies) => {
            for reply in &replies {
                if let Err(err) = sink.deliver(inbound.chat, reply).await {
                    warn!(
                        user = %inbound.user,
                        chat = %inbound.chat,
                        error = %err,
                        "reply delivery failed"
                    );
                }
            }
        }
        Err(err) => error!(user = %inbound.user, error = %err, "engine rejected event"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use cadenza_core::engine::{ChatEvent, FormatChoice, MenuAction, Reply};
    use cadenza_core::error::{CadenzaError, Result};
    use cadenza_core::resolver::{DownloadedMedia, MediaResolver};
    use cadenza_core::session::{Candidate, InMemorySessionStore, MediaKind, SessionStore};
    use cadenza_core::transport::ChatId;

    /// Sink that records deliveries; delivery can be scripted to fail.
    struct RecordingSink {
        replies: StdMutex<Vec<(ChatId, Reply)>>,
        acks: StdMutex<Vec<String>>,
        fail_delivery: bool,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                replies: StdMutex::new(Vec::new()),
                acks: StdMutex::new(Vec::new()),
                fail_delivery: false,
            }
        }
    }

    #[async_trait]
    impl ReplySink for RecordingSink {
        async fn deliver(&self, chat: ChatId, reply: &Reply) -> Result<()> {
            if self.fail_delivery {
                return Err(CadenzaError::transport("send failed"));
            }
            self.replies.lock().unwrap().push((chat, reply.clone()));
            Ok(())
        }

        async fn ack(&self, callback_id: &str) -> Result<()> {
            self.acks.lock().unwrap().push(callback_id.to_string());
            Ok(())
        }
    }

    /// Resolver whose download dwells long enough for later events to pile
    /// up behind it, recording invocation order.
    struct SlowResolver {
        calls: StdMutex<Vec<(String, MediaKind, FormatChoice)>>,
    }

    impl SlowResolver {
        fn new() -> Self {
            Self {
                calls: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MediaResolver for SlowResolver {
        async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<Candidate>> {
            Ok(vec![Candidate {
                title: "hit".into(),
                resolvable_url: "https://example.com/hit".into(),
            }])
        }

        async fn download(
            &self,
            url: &str,
            kind: MediaKind,
            format: FormatChoice,
        ) -> Result<DownloadedMedia> {
            tokio::time::sleep(Duration::from_millis(30)).await;
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), kind, format));
            Ok(DownloadedMedia {
                file_path: "/tmp/hit.mp4".into(),
                title: "hit".into(),
                canonical_url: url.to_string(),
            })
        }
    }

    fn inbound(user: i64, event: ChatEvent) -> InboundEvent {
        InboundEvent {
            user: UserId(user),
            chat: ChatId(user),
            callback_id: None,
            event,
        }
    }

    async fn wait_until(mut check: impl AsyncFnMut() -> bool) {
        for _ in 0..100 {
            if check().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn rapid_fire_same_user_events_apply_in_arrival_order() {
        let store = Arc::new(InMemorySessionStore::new());
        let resolver = Arc::new(SlowResolver::new());
        let engine = Arc::new(ConversationEngine::new(store.clone(), resolver.clone(), 10));
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = Dispatcher::new(engine, sink.clone());

        // Enqueue without waiting in between: the quality press must still
        // observe the mode and the pending URL set by the earlier events.
        dispatcher
            .dispatch(inbound(1, ChatEvent::Menu(MenuAction::Video)))
            .await;
        dispatcher
            .dispatch(inbound(
                1,
                ChatEvent::Text("https://example.com/clip".into()),
            ))
            .await;
        dispatcher
            .dispatch(inbound(1, ChatEvent::QualityPicked(FormatChoice::P360)))
            .await;

        let store_check = store.clone();
        wait_until(async || {
            store_check.get(UserId(1)).await.unwrap().history.len() == 1
        })
        .await;

        assert_eq!(
            resolver.calls.lock().unwrap().as_slice(),
            [(
                "https://example.com/clip".to_string(),
                MediaKind::Video,
                FormatChoice::P360
            )]
        );
        let session = store.get(UserId(1)).await.unwrap();
        assert_eq!(session.history[0].kind, MediaKind::Video);
    }

    #[tokio::test]
    async fn different_users_are_processed_independently() {
        let store = Arc::new(InMemorySessionStore::new());
        let resolver = Arc::new(SlowResolver::new());
        let engine = Arc::new(ConversationEngine::new(store.clone(), resolver, 10));
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = Dispatcher::new(engine, sink.clone());

        dispatcher
            .dispatch(inbound(1, ChatEvent::Menu(MenuAction::Audio)))
            .await;
        dispatcher
            .dispatch(inbound(2, ChatEvent::Menu(MenuAction::Video)))
            .await;

        let store_check = store.clone();
        wait_until(async || {
            let one = store_check.get(UserId(1)).await.unwrap();
            let two = store_check.get(UserId(2)).await.unwrap();
            one.mode == Some(MediaKind::Audio) && two.mode == Some(MediaKind::Video)
        })
        .await;
    }

    #[tokio::test]
    async fn callback_events_are_acknowledged() {
        let store = Arc::new(InMemorySessionStore::new());
        let resolver = Arc::new(SlowResolver::new());
        let engine = Arc::new(ConversationEngine::new(store, resolver, 10));
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = Dispatcher::new(engine, sink.clone());

        dispatcher
            .dispatch(InboundEvent {
                user: UserId(1),
                chat: ChatId(1),
                callback_id: Some("cb-7".into()),
                event: ChatEvent::Menu(MenuAction::Menu),
            })
            .await;

        let sink_check = sink.clone();
        wait_until(async move || !sink_check.replies.lock().unwrap().is_empty()).await;
        assert_eq!(sink.acks.lock().unwrap().as_slice(), ["cb-7"]);
    }

    #[tokio::test]
    async fn delivery_failure_does_not_stall_the_worker() {
        let store = Arc::new(InMemorySessionStore::new());
        let resolver = Arc::new(SlowResolver::new());
        let engine = Arc::new(ConversationEngine::new(store.clone(), resolver, 10));
        let sink = Arc::new(RecordingSink {
            replies: StdMutex::new(Vec::new()),
            acks: StdMutex::new(Vec::new()),
            fail_delivery: true,
        });
        let dispatcher = Dispatcher::new(engine, sink);

        dispatcher
            .dispatch(inbound(1, ChatEvent::Menu(MenuAction::Audio)))
            .await;
        dispatcher
            .dispatch(inbound(1, ChatEvent::Menu(MenuAction::Video)))
            .await;

        // Both events still mutate the session even though nothing could
        // be delivered.
        let store_check = store.clone();
        wait_until(async || {
            store_check.get(UserId(1)).await.unwrap().mode == Some(MediaKind::Video)
        })
        .await;
    }
}
