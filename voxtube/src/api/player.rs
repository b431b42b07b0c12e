//! Extraction des formats de streaming d'une vidéo
//!
//! L'endpoint /player retourne la liste des formats adaptatifs d'une vidéo.
//! Les formats audio seuls y sont déjà classés par qualité décroissante ;
//! la sélection du "meilleur" format consiste à prendre le premier.

use super::TubeApi;
use crate::error::{Result, TubeError};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Nom de client envoyé dans le contexte innertube
const PLAYER_CLIENT_NAME: &str = "ANDROID";

/// Version de client envoyée dans le contexte innertube
const PLAYER_CLIENT_VERSION: &str = "19.09.37";

/// Réponse de l'endpoint /player
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlayerResponse {
    #[serde(default)]
    streaming_data: Option<StreamingData>,
    #[serde(default)]
    playability_status: Option<PlayabilityStatus>,
}

/// Statut de lisibilité de la vidéo
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlayabilityStatus {
    status: String,
    #[serde(default)]
    reason: Option<String>,
}

/// Données de streaming
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StreamingData {
    #[serde(default)]
    adaptive_formats: Vec<AdaptiveFormat>,
}

/// Un format adaptatif (audio, vidéo, ou mixte)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveFormat {
    pub itag: u32,
    #[serde(default)]
    pub url: Option<String>,
    pub mime_type: String,
    #[serde(default)]
    pub bitrate: Option<u64>,
    #[serde(default)]
    pub audio_quality: Option<String>,
}

impl AdaptiveFormat {
    /// Vrai si le format est audio seul et directement lisible
    pub fn is_audio_only(&self) -> bool {
        self.mime_type.starts_with("audio/") && self.url.is_some()
    }
}

impl TubeApi {
    /// Récupère les formats audio seuls d'une vidéo
    ///
    /// L'ordre de la liste retournée par le catalogue est préservé.
    pub async fn get_audio_formats(&self, video_id: &str) -> Result<Vec<AdaptiveFormat>> {
        debug!("Fetching stream formats for video {}", video_id);

        let body = json!({
            "videoId": video_id,
            "context": {
                "client": {
                    "clientName": PLAYER_CLIENT_NAME,
                    "clientVersion": PLAYER_CLIENT_VERSION,
                }
            }
        });

        let response: PlayerResponse = self.post_json("/player", &body).await?;

        if let Some(status) = &response.playability_status {
            if status.status != "OK" {
                let reason = status
                    .reason
                    .clone()
                    .unwrap_or_else(|| status.status.clone());
                return Err(TubeError::NotPlayable(reason));
            }
        }

        let formats = response
            .streaming_data
            .map(|data| {
                data.adaptive_formats
                    .into_iter()
                    .filter(AdaptiveFormat::is_audio_only)
                    .collect()
            })
            .unwrap_or_default();

        Ok(formats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(mime: &str, url: Option<&str>) -> AdaptiveFormat {
        AdaptiveFormat {
            itag: 140,
            url: url.map(str::to_string),
            mime_type: mime.to_string(),
            bitrate: Some(128_000),
            audio_quality: None,
        }
    }

    #[test]
    fn test_audio_only_requires_audio_mime() {
        assert!(format("audio/mp4; codecs=\"mp4a.40.2\"", Some("u")).is_audio_only());
        assert!(!format("video/mp4; codecs=\"avc1\"", Some("u")).is_audio_only());
    }

    #[test]
    fn test_audio_only_requires_direct_url() {
        assert!(!format("audio/webm; codecs=\"opus\"", None).is_audio_only());
    }
}
