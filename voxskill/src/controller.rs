//! Playback session controller.
//!
//! The only stateful decision-maker in the skill: it turns user intents and
//! player lifecycle events into session mutations and outbound player
//! directives. The platform serializes invocations per end-user session;
//! the controller states that assumption here rather than relying on it
//! silently, and additionally guards the one suspension point (resolution)
//! against out-of-order completion.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use voxtube::{ResolvedMedia, TubeClient, VideoItem};

use crate::errors::Result;
use crate::model::{PlayerDirective, PlayerEvent, SessionId};
use crate::session::{PlaybackState, SessionRegistry, apply_event};

/// Seam between the controller and the stream resolver.
///
/// One call, one attempt, one failure mode; retries and fallbacks are
/// explicitly not this trait's business.
#[async_trait]
pub trait ResolveMedia: Send + Sync {
    async fn resolve(&self, query: &str) -> voxtube::Result<ResolvedMedia>;
}

#[async_trait]
impl ResolveMedia for TubeClient {
    async fn resolve(&self, query: &str) -> voxtube::Result<ResolvedMedia> {
        TubeClient::resolve(self, query).await
    }
}

/// Outcome of a play request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The stream was loaded into the session and must be played.
    Loaded {
        video: VideoItem,
        directive: PlayerDirective,
    },
    /// A newer play request claimed the session while this one was
    /// resolving; nothing was committed and no directive is emitted.
    Superseded,
}

/// Outcome of a resume request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResumeOutcome {
    Resumed(PlayerDirective),
    /// Nothing is loaded. Not an error: the platform's default framing for
    /// "nothing to resume" applies.
    NothingToResume,
}

/// The skill's playback controller.
///
/// Owns the session registry; every session mutation in the process goes
/// through one of the four operations below.
pub struct SkillController {
    resolver: Arc<dyn ResolveMedia>,
    sessions: SessionRegistry,
}

impl SkillController {
    pub fn new(resolver: Arc<dyn ResolveMedia>) -> Self {
        Self {
            resolver,
            sessions: SessionRegistry::new(),
        }
    }

    /// Resolves `query` and loads the result into the session at offset 0.
    ///
    /// On resolution failure the session is left untouched and the error
    /// propagates for the dispatch boundary to convert. A stale completion
    /// (superseded by a newer play on the same session) commits nothing.
    pub async fn play(&self, session: &SessionId, query: &str) -> Result<PlayOutcome> {
        let token = self
            .sessions
            .with_session(session, |s| s.claim_generation());

        let media = self.resolver.resolve(query).await?;

        let committed = self.sessions.with_session(session, |s| {
            s.commit_load(token, media.stream.url.clone())
        });

        if !committed {
            warn!(session=%session, query=%query, "Play superseded by a newer request");
            return Ok(PlayOutcome::Superseded);
        }

        info!(session=%session, video=%media.video.id, "Loaded '{}'", media.video.title);

        Ok(PlayOutcome::Loaded {
            directive: PlayerDirective::play(media.stream.url, 0),
            video: media.video,
        })
    }

    /// Emits a stop directive. Idempotent; never touches the stored offset,
    /// which is only written once the player confirms the stop through its
    /// lifecycle event.
    pub fn stop(&self, session: &SessionId) -> PlayerDirective {
        debug!(session=%session, "Stop requested");
        PlayerDirective::Stop
    }

    /// Re-issues a play directive from the stored stream and offset.
    pub fn resume(&self, session: &SessionId) -> ResumeOutcome {
        match self.sessions.state(session) {
            PlaybackState::Loaded {
                stream_url,
                offset_millis,
            } => {
                debug!(session=%session, offset_millis, "Resuming playback");
                ResumeOutcome::Resumed(PlayerDirective::play(stream_url, offset_millis))
            }
            PlaybackState::Empty => {
                debug!(session=%session, "Nothing to resume");
                ResumeOutcome::NothingToResume
            }
        }
    }

    /// Dispatches a player lifecycle event.
    ///
    /// `Stopped` is the only event that mutates the session. `Failed` is
    /// best-effort telemetry: logged, never spoken, never a controller
    /// error. The match is exhaustive; unknown wire kinds were already
    /// rejected at the parse boundary.
    pub fn player_event(&self, session: &SessionId, event: PlayerEvent) {
        match &event {
            PlayerEvent::Started => info!(session=%session, "Playback started"),
            PlayerEvent::Finished => info!(session=%session, "Playback finished"),
            PlayerEvent::NearlyFinished => debug!(session=%session, "Playback nearly finished"),
            PlayerEvent::Stopped { offset_millis } => {
                info!(session=%session, ?offset_millis, "Playback stopped");
            }
            PlayerEvent::Failed { error } => {
                warn!(session=%session, ?error, "Playback failed");
            }
        }

        self.sessions
            .with_session(session, |s| s.state = apply_event(s.state.clone(), &event));
    }

    /// Observable state of a session.
    pub fn session_state(&self, session: &SessionId) -> PlaybackState {
        self.sessions.state(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::Notify;
    use voxtube::{AudioStream, TubeError};

    fn media(id: &str, title: &str, url: &str) -> ResolvedMedia {
        ResolvedMedia {
            video: VideoItem {
                id: id.to_string(),
                title: title.to_string(),
                channel_title: "Channel".to_string(),
                thumbnail_url: format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg"),
            },
            stream: AudioStream {
                url: url.to_string(),
                mime_type: "audio/mp4".to_string(),
                itag: 140,
                bitrate: None,
            },
        }
    }

    /// Resolver stub: canned results per query, with optional gates to hold
    /// a resolution in flight until the test releases it.
    #[derive(Default)]
    struct StubResolver {
        media: HashMap<String, ResolvedMedia>,
        gates: Mutex<HashMap<String, Arc<Notify>>>,
    }

    impl StubResolver {
        fn with(mut self, query: &str, resolved: ResolvedMedia) -> Self {
            self.media.insert(query.to_string(), resolved);
            self
        }

        fn gate(&self, query: &str) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            self.gates
                .lock()
                .unwrap()
                .insert(query.to_string(), gate.clone());
            gate
        }
    }

    #[async_trait]
    impl ResolveMedia for StubResolver {
        async fn resolve(&self, query: &str) -> voxtube::Result<ResolvedMedia> {
            let gate = self.gates.lock().unwrap().get(query).cloned();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            self.media
                .get(query)
                .cloned()
                .ok_or_else(|| TubeError::NoResults(query.to_string()))
        }
    }

    fn controller_with(resolver: StubResolver) -> SkillController {
        SkillController::new(Arc::new(resolver))
    }

    fn session() -> SessionId {
        SessionId::from("session-1")
    }

    #[tokio::test]
    async fn successful_play_loads_at_offset_zero() {
        let controller = controller_with(
            StubResolver::default().with(
                "lofi beats",
                media("abc123", "Lofi Beats", "https://stream/abc123"),
            ),
        );
        let id = session();

        let outcome = controller.play(&id, "lofi beats").await.unwrap();

        match outcome {
            PlayOutcome::Loaded { video, directive } => {
                assert_eq!(video.title, "Lofi Beats");
                assert_eq!(
                    directive,
                    PlayerDirective::play("https://stream/abc123", 0)
                );
            }
            PlayOutcome::Superseded => panic!("play should not be superseded"),
        }

        assert_eq!(
            controller.session_state(&id),
            PlaybackState::Loaded {
                stream_url: "https://stream/abc123".into(),
                offset_millis: 0,
            }
        );
    }

    #[tokio::test]
    async fn failed_play_leaves_session_untouched() {
        let id = session();

        // Pre-load something so the failure has state to (not) disturb.
        let controller = controller_with(
            StubResolver::default().with(
                "lofi beats",
                media("abc123", "Lofi Beats", "https://stream/abc123"),
            ),
        );
        controller.play(&id, "lofi beats").await.unwrap();
        controller.player_event(
            &id,
            PlayerEvent::Stopped {
                offset_millis: Some(1234),
            },
        );
        let before = controller.session_state(&id);

        let err = controller.play(&id, "unknown song").await.unwrap_err();
        assert!(matches!(
            err,
            crate::errors::SkillError::Resolution(TubeError::NoResults(_))
        ));

        assert_eq!(controller.session_state(&id), before);
    }

    #[tokio::test]
    async fn resume_reuses_stored_offset() {
        let controller = controller_with(
            StubResolver::default().with(
                "lofi beats",
                media("abc123", "Lofi Beats", "https://stream/abc123"),
            ),
        );
        let id = session();

        controller.play(&id, "lofi beats").await.unwrap();
        controller.player_event(
            &id,
            PlayerEvent::Stopped {
                offset_millis: Some(45230),
            },
        );

        let outcome = controller.resume(&id);
        assert_eq!(
            outcome,
            ResumeOutcome::Resumed(PlayerDirective::play("https://stream/abc123", 45230))
        );
    }

    #[tokio::test]
    async fn resume_on_empty_session_is_a_no_op() {
        let controller = controller_with(StubResolver::default());
        assert_eq!(controller.resume(&session()), ResumeOutcome::NothingToResume);
    }

    #[tokio::test]
    async fn stop_is_idempotent_regardless_of_load_state() {
        let controller = controller_with(StubResolver::default());
        let id = session();

        assert_eq!(controller.stop(&id), PlayerDirective::Stop);
        assert_eq!(controller.stop(&id), PlayerDirective::Stop);
    }

    #[tokio::test]
    async fn failed_event_changes_nothing() {
        let controller = controller_with(
            StubResolver::default().with(
                "lofi beats",
                media("abc123", "Lofi Beats", "https://stream/abc123"),
            ),
        );
        let id = session();

        controller.play(&id, "lofi beats").await.unwrap();
        let before = controller.session_state(&id);

        controller.player_event(
            &id,
            PlayerEvent::Failed {
                error: Some("MEDIA_ERROR_UNKNOWN".into()),
            },
        );

        assert_eq!(controller.session_state(&id), before);
    }

    #[tokio::test]
    async fn stale_resolution_does_not_overwrite_newer_state() {
        let resolver = StubResolver::default()
            .with("slow song", media("old111", "Old", "https://stream/old111"))
            .with("fast song", media("new222", "New", "https://stream/new222"));
        let gate = resolver.gate("slow song");
        let controller = Arc::new(controller_with(resolver));
        let id = session();

        let slow = tokio::spawn({
            let controller = controller.clone();
            let id = id.clone();
            async move { controller.play(&id, "slow song").await }
        });
        tokio::task::yield_now().await;

        // A newer play lands while the first resolution is still in flight.
        controller.play(&id, "fast song").await.unwrap();

        gate.notify_one();
        let outcome = slow.await.unwrap().unwrap();

        assert_eq!(outcome, PlayOutcome::Superseded);
        assert_eq!(
            controller.session_state(&id),
            PlaybackState::Loaded {
                stream_url: "https://stream/new222".into(),
                offset_millis: 0,
            }
        );
    }

    #[tokio::test]
    async fn sessions_are_isolated_by_id() {
        let controller = controller_with(
            StubResolver::default().with(
                "lofi beats",
                media("abc123", "Lofi Beats", "https://stream/abc123"),
            ),
        );

        let first = SessionId::from("session-1");
        let second = SessionId::from("session-2");

        controller.play(&first, "lofi beats").await.unwrap();

        assert!(controller.session_state(&first).is_loaded());
        assert_eq!(controller.session_state(&second), PlaybackState::Empty);
    }
}
