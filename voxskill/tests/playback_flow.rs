//! End-to-end dispatch tests: wire envelopes in, responses and directives
//! out, with a canned resolver standing in for the catalog.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use voxskill::{
    PlaybackState, PlayerDirective, RequestEnvelope, ResolveMedia, SessionId, SkillController,
    SkillDispatcher, SkillResponse,
};
use voxtube::{AudioStream, ResolvedMedia, TubeError, VideoItem};

struct CannedResolver;

#[async_trait]
impl ResolveMedia for CannedResolver {
    async fn resolve(&self, query: &str) -> voxtube::Result<ResolvedMedia> {
        if query != "lofi beats" {
            return Err(TubeError::NoResults(query.to_string()));
        }
        Ok(ResolvedMedia {
            video: VideoItem {
                id: "abc123".into(),
                title: "Lofi Beats".into(),
                channel_title: "Lofi Channel".into(),
                thumbnail_url: "https://i.ytimg.com/vi/abc123/hqdefault.jpg".into(),
            },
            stream: AudioStream {
                url: "https://stream/abc123".into(),
                mime_type: "audio/mp4".into(),
                itag: 140,
                bitrate: None,
            },
        })
    }
}

fn dispatcher() -> SkillDispatcher {
    SkillDispatcher::new(Arc::new(SkillController::new(Arc::new(CannedResolver))))
}

fn envelope(request: serde_json::Value) -> RequestEnvelope {
    serde_json::from_value(json!({ "sessionId": "session-1", "request": request }))
        .expect("envelope deserializes")
}

fn intent(name: &str) -> serde_json::Value {
    json!({ "type": "IntentRequest", "intent": { "name": name, "slots": {} } })
}

fn play_intent(query: &str) -> serde_json::Value {
    json!({
        "type": "IntentRequest",
        "intent": { "name": "PlayIntent", "slots": { "query": { "value": query } } }
    })
}

async fn send(dispatcher: &SkillDispatcher, request: serde_json::Value) -> SkillResponse {
    dispatcher
        .dispatch(envelope(request))
        .await
        .expect("dispatch succeeds")
}

#[tokio::test]
async fn play_then_stop_then_resume_round_trip() {
    let dispatcher = dispatcher();

    // Play: resolved stream loaded at offset 0, spoken confirmation + card.
    let response = send(&dispatcher, play_intent("lofi beats")).await;
    assert_eq!(
        response.speech_text.as_deref(),
        Some("Now playing Lofi Beats")
    );
    assert_eq!(
        response.directive,
        Some(PlayerDirective::play("https://stream/abc123", 0))
    );
    let card = response.card.expect("card");
    assert_eq!(card.subtitle, "By Lofi Channel");

    // The player confirms a stop partway through the track.
    send(
        &dispatcher,
        json!({ "type": "AudioPlayer.PlaybackStopped", "offsetInMilliseconds": 45230 }),
    )
    .await;

    // Resume picks up exactly where the player said it stopped.
    let response = send(&dispatcher, intent("AMAZON.ResumeIntent")).await;
    assert_eq!(
        response.directive,
        Some(PlayerDirective::play("https://stream/abc123", 45230))
    );
}

#[tokio::test]
async fn failed_resolution_apologizes_and_touches_nothing() {
    let dispatcher = dispatcher();
    let controller = dispatcher.controller();

    let response = send(&dispatcher, play_intent("unknown song")).await;

    assert!(response.speech_text.unwrap().starts_with("Sorry"));
    assert!(response.directive.is_none());
    assert_eq!(
        controller.session_state(&SessionId::from("session-1")),
        PlaybackState::Empty
    );
}

#[tokio::test]
async fn missing_query_slot_is_an_apology() {
    let dispatcher = dispatcher();

    let response = send(&dispatcher, intent("PlayIntent")).await;

    assert!(response.speech_text.unwrap().starts_with("Sorry"));
    assert!(response.directive.is_none());
}

#[tokio::test]
async fn resume_with_nothing_loaded_emits_no_directive() {
    let dispatcher = dispatcher();

    let response = send(&dispatcher, intent("AMAZON.ResumeIntent")).await;

    assert!(response.directive.is_none());
    assert!(response.speech_text.is_none());
}

#[tokio::test]
async fn stop_twice_emits_a_stop_directive_both_times() {
    let dispatcher = dispatcher();

    for _ in 0..2 {
        let response = send(&dispatcher, intent("AMAZON.StopIntent")).await;
        assert_eq!(response.directive, Some(PlayerDirective::Stop));
    }
}

#[tokio::test]
async fn pause_and_cancel_also_stop() {
    let dispatcher = dispatcher();

    for name in ["AMAZON.PauseIntent", "AMAZON.CancelIntent"] {
        let response = send(&dispatcher, intent(name)).await;
        assert_eq!(response.directive, Some(PlayerDirective::Stop));
    }
}

#[tokio::test]
async fn playback_failed_is_swallowed_and_state_kept() {
    let dispatcher = dispatcher();
    let controller = dispatcher.controller();
    let session = SessionId::from("session-1");

    send(&dispatcher, play_intent("lofi beats")).await;
    let before = controller.session_state(&session);

    let response = send(
        &dispatcher,
        json!({
            "type": "AudioPlayer.PlaybackFailed",
            "error": { "type": "MEDIA_ERROR_UNKNOWN", "message": "decoder gave up" }
        }),
    )
    .await;

    assert!(response.speech_text.is_none());
    assert_eq!(controller.session_state(&session), before);
}

#[tokio::test]
async fn unknown_lifecycle_event_is_a_hard_error() {
    let dispatcher = dispatcher();

    let result = dispatcher
        .dispatch(envelope(json!({ "type": "AudioPlayer.SomethingUnrecognized" })))
        .await;

    let err = result.expect_err("unknown lifecycle kinds must fail loudly");
    assert!(err.is_fatal());
}

#[tokio::test]
async fn launch_request_greets_and_keeps_session_open() {
    let dispatcher = dispatcher();

    let response = send(&dispatcher, json!({ "type": "LaunchRequest" })).await;

    assert_eq!(response.speech_text.as_deref(), Some("Welcome to VoxTube"));
    assert!(!response.should_end_session);
}

#[tokio::test]
async fn unrouted_intents_are_reflected() {
    let dispatcher = dispatcher();

    let response = send(&dispatcher, intent("HelloWorldIntent")).await;

    assert_eq!(
        response.speech_text.as_deref(),
        Some("You just triggered HelloWorldIntent")
    );
}

#[tokio::test]
async fn sessions_with_different_ids_do_not_share_state() {
    let dispatcher = dispatcher();
    let controller = dispatcher.controller();

    send(&dispatcher, play_intent("lofi beats")).await;

    let other: RequestEnvelope = serde_json::from_value(json!({
        "sessionId": "session-2",
        "request": { "type": "IntentRequest",
                     "intent": { "name": "AMAZON.ResumeIntent", "slots": {} } }
    }))
    .unwrap();
    let response = dispatcher.dispatch(other).await.unwrap();

    assert!(response.directive.is_none());
    assert!(controller.session_state(&SessionId::from("session-1")).is_loaded());
}
