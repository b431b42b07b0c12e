use serde::{Deserialize, Serialize};

use crate::errors::SkillError;

/// Platform-supplied session identifier.
///
/// Sessions are keyed by this identifier; nothing in the skill assumes a
/// single global session.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        SessionId(value.to_string())
    }
}

/// Instruction handed to the external player subsystem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PlayerDirective {
    /// Replace any current playback and start the stream at the given offset.
    #[serde(rename_all = "camelCase")]
    Play {
        stream_url: String,
        offset_millis: u64,
        replace: bool,
    },
    /// Stop playback. Idempotent even when nothing is loaded.
    Stop,
}

impl PlayerDirective {
    pub fn play(stream_url: impl Into<String>, offset_millis: u64) -> Self {
        PlayerDirective::Play {
            stream_url: stream_url.into(),
            offset_millis,
            replace: true,
        }
    }
}

/// Asynchronous lifecycle notification from the external audio player.
///
/// The five known kinds are closed: matching over this enum is exhaustive by
/// construction, and an unrecognized wire kind fails at the parse boundary
/// instead of falling into a silent default branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerEvent {
    Started,
    Finished,
    /// The player confirmed a stop and reports the position it stopped at.
    /// A missing offset is never guessed; the transition leaves the stored
    /// offset untouched in that case.
    Stopped { offset_millis: Option<u64> },
    NearlyFinished,
    Failed { error: Option<String> },
}

impl PlayerEvent {
    /// Parses a wire event kind (the part after `AudioPlayer.`).
    ///
    /// # Errors
    ///
    /// `SkillError::UnknownLifecycleEvent` for any kind outside the five
    /// known ones. This is a programming-contract violation and must fail
    /// loudly: silently ignoring an unknown lifecycle event risks state
    /// drift.
    pub fn from_wire(
        kind: &str,
        offset_millis: Option<u64>,
        error: Option<String>,
    ) -> Result<Self, SkillError> {
        match kind {
            "PlaybackStarted" => Ok(PlayerEvent::Started),
            "PlaybackFinished" => Ok(PlayerEvent::Finished),
            "PlaybackStopped" => Ok(PlayerEvent::Stopped { offset_millis }),
            "PlaybackNearlyFinished" => Ok(PlayerEvent::NearlyFinished),
            "PlaybackFailed" => Ok(PlayerEvent::Failed { error }),
            other => Err(SkillError::UnknownLifecycleEvent(other.to_string())),
        }
    }
}

/// Display card attached to a spoken response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub title: String,
    pub subtitle: String,
    pub image_url: String,
}

/// User-facing response payload handed to the platform responder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SkillResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directive: Option<PlayerDirective>,
    pub should_end_session: bool,
}

impl SkillResponse {
    /// Response with no speech, no card and no directive.
    pub fn empty() -> Self {
        SkillResponse {
            should_end_session: true,
            ..Default::default()
        }
    }

    pub fn with_speech(mut self, speech: impl Into<String>) -> Self {
        self.speech_text = Some(speech.into());
        self
    }

    pub fn with_reprompt(mut self, reprompt: impl Into<String>) -> Self {
        self.reprompt = Some(reprompt.into());
        self
    }

    pub fn with_card(mut self, card: Card) -> Self {
        self.card = Some(card);
        self
    }

    pub fn with_directive(mut self, directive: PlayerDirective) -> Self {
        self.directive = Some(directive);
        self
    }

    pub fn keep_session_open(mut self) -> Self {
        self.should_end_session = false;
        self
    }
}
