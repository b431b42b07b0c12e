//! Playback session state.
//!
//! The state machine is deliberately small: either nothing is loaded, or one
//! stream is loaded together with the last position the player confirmed.
//! All mutations are funneled through [`SessionRegistry`] by the controller;
//! no other component writes here.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::model::{PlayerEvent, SessionId};

/// What is currently loaded, and where.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// No media loaded. Offset is meaningless here.
    #[default]
    Empty,
    /// A stream is loaded; `offset_millis` is the last confirmed position.
    Loaded {
        stream_url: String,
        offset_millis: u64,
    },
}

impl PlaybackState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, PlaybackState::Loaded { .. })
    }
}

/// Pure transition function over player lifecycle events.
///
/// The only event that moves state is a confirmed stop carrying an offset:
/// it is the sole writer of `offset_millis` after a load. Everything else is
/// observability-only.
pub fn apply_event(state: PlaybackState, event: &PlayerEvent) -> PlaybackState {
    match event {
        PlayerEvent::Stopped {
            offset_millis: Some(offset),
        } => match state {
            PlaybackState::Loaded { stream_url, .. } => PlaybackState::Loaded {
                stream_url,
                offset_millis: *offset,
            },
            // Stop confirmed before a load was ever observed: nothing to
            // update, and no offset to corrupt.
            PlaybackState::Empty => {
                debug!("Playback stopped with no media loaded");
                PlaybackState::Empty
            }
        },
        PlayerEvent::Stopped {
            offset_millis: None,
        } => {
            warn!("Playback stopped without an offset, keeping last known position");
            state
        }
        PlayerEvent::Started
        | PlayerEvent::Finished
        | PlayerEvent::NearlyFinished
        | PlayerEvent::Failed { .. } => state,
    }
}

/// One playback session: observable state plus a load generation counter.
///
/// The generation counter guards against out-of-order resolution: a play
/// request claims a generation before suspending on the resolver, and only
/// commits its result if no newer play has claimed a higher one since.
#[derive(Debug, Default)]
pub struct PlaybackSession {
    pub state: PlaybackState,
    generation: u64,
}

impl PlaybackSession {
    /// Claims the next load generation. Called at the start of a play
    /// request, before the resolver suspends.
    pub fn claim_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Commits a freshly resolved stream if `token` is still the newest
    /// claimed generation. Returns false when a newer play superseded it.
    pub fn commit_load(&mut self, token: u64, stream_url: String) -> bool {
        if self.generation != token {
            return false;
        }
        self.state = PlaybackState::Loaded {
            stream_url,
            offset_millis: 0,
        };
        true
    }
}

/// Registry of playback sessions keyed by platform session identifier.
///
/// Lock scope never spans an await point: the controller claims a generation,
/// releases the lock, suspends on the resolver, then re-locks to commit.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, PlaybackSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with exclusive access to the session, creating it empty on
    /// first use.
    pub fn with_session<R>(&self, id: &SessionId, f: impl FnOnce(&mut PlaybackSession) -> R) -> R {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions.entry(id.clone()).or_default();
        f(session)
    }

    /// Snapshot of a session's observable state.
    pub fn state(&self, id: &SessionId) -> PlaybackState {
        self.with_session(id, |session| session.state.clone())
    }
}
