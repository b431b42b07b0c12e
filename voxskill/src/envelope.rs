//! Platform request envelope and dispatch.
//!
//! Thin glue between the platform's wire format and the controller. Intents
//! are routed to controller operations; player lifecycle notifications are
//! parsed into [`PlayerEvent`]s. Any error out of an intent handler becomes
//! the fixed apology response here, with one exception: an unknown lifecycle
//! event kind is a contract violation and propagates as a hard error instead
//! of being swallowed.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::controller::{PlayOutcome, ResumeOutcome, SkillController};
use crate::errors::{Result, SkillError};
use crate::model::{PlayerEvent, SessionId, SkillResponse};
use crate::speech;

/// Session id used when the platform did not supply one.
const ANONYMOUS_SESSION: &str = "anonymous";

/// Prefix of player lifecycle notification types on the wire.
const AUDIO_PLAYER_PREFIX: &str = "AudioPlayer.";

/// Incoming request envelope as produced by the voice platform.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    #[serde(default)]
    pub session_id: Option<String>,
    pub request: Request,
}

/// The request itself. `request_type` is kept as the raw wire string so the
/// `AudioPlayer.*` family can be routed on its suffix, the way the platform
/// names lifecycle notifications.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(rename = "type")]
    pub request_type: String,
    #[serde(default)]
    pub intent: Option<Intent>,
    #[serde(default)]
    pub offset_in_milliseconds: Option<u64>,
    #[serde(default)]
    pub error: Option<PlayerErrorPayload>,
}

/// A recognized intent with its slot values.
#[derive(Debug, Deserialize)]
pub struct Intent {
    pub name: String,
    #[serde(default)]
    pub slots: HashMap<String, Slot>,
}

impl Intent {
    /// Non-empty value of a slot, if present.
    pub fn slot(&self, name: &str) -> Option<&str> {
        self.slots
            .get(name)
            .and_then(|slot| slot.value.as_deref())
            .filter(|value| !value.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct Slot {
    #[serde(default)]
    pub value: Option<String>,
}

/// Error payload attached to `AudioPlayer.PlaybackFailed`.
#[derive(Debug, Deserialize)]
pub struct PlayerErrorPayload {
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl PlayerErrorPayload {
    fn describe(&self) -> String {
        match (&self.r#type, &self.message) {
            (Some(t), Some(m)) => format!("{t}: {m}"),
            (Some(t), None) => t.clone(),
            (None, Some(m)) => m.clone(),
            (None, None) => "unknown player error".to_string(),
        }
    }
}

/// Routes envelopes to the controller and builds the user-facing response.
pub struct SkillDispatcher {
    controller: Arc<SkillController>,
}

impl SkillDispatcher {
    pub fn new(controller: Arc<SkillController>) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> Arc<SkillController> {
        self.controller.clone()
    }

    /// Handles one envelope.
    ///
    /// # Errors
    ///
    /// Only `SkillError::UnknownLifecycleEvent` escapes; every other failure
    /// is converted to the apology response so the platform never sees an
    /// unhandled crash for a user-recoverable problem.
    pub async fn dispatch(&self, envelope: RequestEnvelope) -> Result<SkillResponse> {
        let session = SessionId(
            envelope
                .session_id
                .unwrap_or_else(|| ANONYMOUS_SESSION.to_string()),
        );
        let request = envelope.request;

        if let Some(kind) = request.request_type.strip_prefix(AUDIO_PLAYER_PREFIX) {
            return self.handle_player_event(&session, kind, &request);
        }

        match request.request_type.as_str() {
            "LaunchRequest" => Ok(speech::welcome()),
            "SessionEndedRequest" => {
                debug!(session=%session, "Session ended");
                Ok(SkillResponse::empty())
            }
            "IntentRequest" => {
                let result = match request.intent {
                    Some(intent) => self.handle_intent(&session, intent).await,
                    None => Err(SkillError::Other(
                        "IntentRequest without an intent".to_string(),
                    )),
                };
                Ok(result.unwrap_or_else(|e| {
                    error!(session=%session, "Intent handling failed: {e}");
                    speech::apology()
                }))
            }
            other => {
                warn!(session=%session, "Unhandled request type '{other}'");
                Ok(speech::apology())
            }
        }
    }

    fn handle_player_event(
        &self,
        session: &SessionId,
        kind: &str,
        request: &Request,
    ) -> Result<SkillResponse> {
        let error = request.error.as_ref().map(PlayerErrorPayload::describe);
        // Unknown kinds fail loudly here: an incomplete dispatch table must
        // never be papered over with an apology.
        let event = PlayerEvent::from_wire(kind, request.offset_in_milliseconds, error)?;
        self.controller.player_event(session, event);
        Ok(SkillResponse::empty())
    }

    async fn handle_intent(&self, session: &SessionId, intent: Intent) -> Result<SkillResponse> {
        debug!(session=%session, intent=%intent.name, "Dispatching intent");

        match intent.name.as_str() {
            "PlayIntent" => {
                let query = intent
                    .slot("query")
                    .ok_or_else(|| SkillError::missing_slot("query"))?;

                match self.controller.play(session, query).await? {
                    PlayOutcome::Loaded { video, directive } => {
                        Ok(speech::now_playing(&video, directive))
                    }
                    PlayOutcome::Superseded => Ok(SkillResponse::empty()),
                }
            }
            "AMAZON.ResumeIntent" => match self.controller.resume(session) {
                ResumeOutcome::Resumed(directive) => {
                    Ok(SkillResponse::empty().with_directive(directive))
                }
                ResumeOutcome::NothingToResume => Ok(SkillResponse::empty()),
            },
            "AMAZON.StopIntent" | "AMAZON.CancelIntent" | "AMAZON.PauseIntent" => {
                let directive = self.controller.stop(session);
                Ok(SkillResponse::empty().with_directive(directive))
            }
            "AMAZON.HelpIntent" => Ok(speech::help()),
            other => Ok(speech::reflect(other)),
        }
    }
}
