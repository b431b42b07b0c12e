//! Speech-response construction.
//!
//! Text building is deliberately kept out of the controller: the controller
//! decides *what happened*, this module decides *what to say about it*.

use voxtube::VideoItem;

use crate::model::{Card, PlayerDirective, SkillResponse};

const WELCOME: &str = "Welcome to VoxTube";
const HELP: &str =
    "You can ask me to play something, for example: play lofi beats. What should I play?";
const APOLOGY: &str = "Sorry, I had trouble doing what you asked. Please try again.";

/// Launch greeting; keeps the session open for a follow-up utterance.
pub fn welcome() -> SkillResponse {
    SkillResponse::empty()
        .with_speech(WELCOME)
        .with_reprompt(WELCOME)
        .keep_session_open()
}

pub fn help() -> SkillResponse {
    SkillResponse::empty()
        .with_speech(HELP)
        .with_reprompt(HELP)
        .keep_session_open()
}

/// Fixed apology for every recoverable failure; ends the turn with no
/// player directive.
pub fn apology() -> SkillResponse {
    SkillResponse::empty()
        .with_speech(APOLOGY)
        .with_reprompt(APOLOGY)
        .keep_session_open()
}

/// Confirmation spoken when a freshly resolved stream starts playing.
pub fn now_playing(video: &VideoItem, directive: PlayerDirective) -> SkillResponse {
    SkillResponse::empty()
        .with_speech(format!("Now playing {}", video.title))
        .with_card(Card {
            title: video.title.clone(),
            subtitle: format!("By {}", video.channel_title),
            image_url: video.thumbnail_url.clone(),
        })
        .with_directive(directive)
}

/// Debug fallback for intents without a dedicated handler: repeats the
/// intent name back to the user.
pub fn reflect(intent_name: &str) -> SkillResponse {
    SkillResponse::empty().with_speech(format!("You just triggered {intent_name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video() -> VideoItem {
        VideoItem {
            id: "abc123".into(),
            title: "Lofi Beats".into(),
            channel_title: "Lofi Channel".into(),
            thumbnail_url: "https://i.ytimg.com/vi/abc123/hqdefault.jpg".into(),
        }
    }

    #[test]
    fn now_playing_builds_speech_card_and_directive() {
        let response = now_playing(&video(), PlayerDirective::play("https://stream/abc123", 0));

        assert_eq!(response.speech_text.as_deref(), Some("Now playing Lofi Beats"));
        assert!(response.should_end_session);

        let card = response.card.expect("card");
        assert_eq!(card.title, "Lofi Beats");
        assert_eq!(card.subtitle, "By Lofi Channel");
        assert_eq!(card.image_url, "https://i.ytimg.com/vi/abc123/hqdefault.jpg");

        assert_eq!(
            response.directive,
            Some(PlayerDirective::play("https://stream/abc123", 0))
        );
    }

    #[test]
    fn apology_has_no_directive() {
        let response = apology();
        assert!(response.directive.is_none());
        assert!(response.speech_text.is_some());
    }
}
