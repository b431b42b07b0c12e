use thiserror::Error;
use voxtube::TubeError;

pub type Result<T> = std::result::Result<T, SkillError>;

#[derive(Error, Debug)]
pub enum SkillError {
    /// Recoverable: converted to the apology response at the dispatch boundary.
    #[error("Stream resolution failed: {0}")]
    Resolution(#[from] TubeError),

    /// Contract violation: the event dispatch table is incomplete. Never
    /// converted to an apology; propagates out of the dispatcher.
    #[error("Unknown player lifecycle event '{0}'")]
    UnknownLifecycleEvent(String),

    /// The intent arrived without a slot its handler requires.
    #[error("Missing slot '{0}' in intent request")]
    MissingSlot(String),

    #[error("Skill error: {0}")]
    Other(String),
}

impl SkillError {
    pub fn missing_slot(name: &str) -> Self {
        SkillError::MissingSlot(name.to_string())
    }

    /// True for errors that must not be downgraded to a spoken apology.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SkillError::UnknownLifecycleEvent(_))
    }
}
