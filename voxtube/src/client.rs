//! Client principal pour résoudre une requête parlée en flux audio
//!
//! Ce module fournit un client haut-niveau avec cache intégré. La résolution
//! enchaîne deux appels externes (recherche du catalogue puis extraction des
//! formats) derrière une seule opération avec un seul mode d'échec.

use crate::api::TubeApi;
use crate::cache::{CachedStream, TubeCache};
use crate::config_ext::TubeConfigExt;
use crate::error::{Result, TubeError};
use crate::models::{AudioStream, ResolvedMedia, VideoItem};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Nombre de résultats demandés au catalogue
///
/// Seul le meilleur résultat est exploité : pas de désambiguïsation, pas de
/// repli sur le résultat suivant en cas d'échec.
const SEARCH_MAX_RESULTS: u32 = 1;

/// Durée de validité supposée d'une URL de flux quand le catalogue
/// ne fournit pas d'horodatage d'expiration exploitable
const DEFAULT_STREAM_VALIDITY: TimeDelta = TimeDelta::seconds(300);

/// Client haut-niveau du catalogue avec cache
pub struct TubeClient {
    /// API bas-niveau
    api: TubeApi,
    /// Cache en mémoire
    cache: Arc<TubeCache>,
}

impl TubeClient {
    /// Crée un nouveau client avec la clé d'API fournie
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            api: TubeApi::new(api_key)?,
            cache: Arc::new(TubeCache::new()),
        })
    }

    /// Crée un client en utilisant la configuration de voxconfig
    ///
    /// # Errors
    ///
    /// Retourne une erreur si la clé d'API n'est pas configurée.
    pub fn from_config() -> Result<Self> {
        let config = voxconfig::get_config();
        let api_key = config.get_tube_api_key()?;

        let search_ttl = config.get_search_cache_ttl().unwrap_or(900);
        let stream_ttl = config.get_stream_cache_ttl().unwrap_or(300);

        Ok(Self {
            api: TubeApi::new(api_key)?,
            cache: Arc::new(TubeCache::with_ttls(
                Duration::from_secs(search_ttl as u64),
                Duration::from_secs(stream_ttl as u64),
            )),
        })
    }

    /// Crée un client à partir d'une API déjà construite
    ///
    /// Utilisé par les tests pour injecter une API pointant vers un mock.
    pub fn with_api(api: TubeApi) -> Self {
        Self {
            api,
            cache: Arc::new(TubeCache::new()),
        }
    }

    /// Retourne une référence au cache
    pub fn cache(&self) -> Arc<TubeCache> {
        self.cache.clone()
    }

    /// Recherche des vidéos dans le catalogue
    pub async fn search_videos(&self, query: &str) -> Result<Vec<VideoItem>> {
        if let Some(videos) = self.cache.get_search(query).await {
            debug!("Search '{}' found in cache", query);
            return Ok(videos);
        }

        let videos = self.api.search_videos(query, SEARCH_MAX_RESULTS).await?;
        self.cache.put_search(query, videos.clone()).await;

        Ok(videos)
    }

    /// Récupère le flux audio d'une vidéo
    ///
    /// Sélectionne le premier format de la liste audio seul déjà classée
    /// par le catalogue.
    pub async fn get_audio_stream(&self, video_id: &str) -> Result<AudioStream> {
        if let Some(entry) = self.cache.get_stream(video_id).await {
            debug!("Stream for video {} found in cache", video_id);
            return Ok(entry.stream);
        }

        let formats = self.api.get_audio_formats(video_id).await?;
        let best = formats
            .into_iter()
            .next()
            .ok_or_else(|| TubeError::NoAudioFormat(video_id.to_string()))?;

        let url = best.url.unwrap_or_default();
        let expires_at = stream_expiry(&url);
        let stream = AudioStream {
            url,
            mime_type: best.mime_type,
            itag: best.itag,
            bitrate: best.bitrate,
        };

        self.cache
            .put_stream(
                video_id.to_string(),
                CachedStream {
                    stream: stream.clone(),
                    expires_at,
                },
            )
            .await;

        Ok(stream)
    }

    /// Résout une requête parlée en un média lisible
    ///
    /// Enchaîne la recherche et l'extraction du flux. Un échec de la recherche
    /// (réseau, quota, réponse invalide) est replié sur `NoResults`, comme une
    /// recherche sans résultat : les deux cas sont indistinguables pour
    /// l'appelant. Une seule tentative, pas de retry.
    pub async fn resolve(&self, query: &str) -> Result<ResolvedMedia> {
        let videos = match self.search_videos(query).await {
            Ok(videos) => videos,
            Err(e) => {
                warn!("Catalog search failed, collapsing to no-results: {}", e);
                return Err(TubeError::NoResults(query.to_string()));
            }
        };

        let video = videos
            .into_iter()
            .next()
            .ok_or_else(|| TubeError::NoResults(query.to_string()))?;

        debug!("Best match for '{}': {} ({})", query, video.title, video.id);

        let stream = self.get_audio_stream(&video.id).await?;

        Ok(ResolvedMedia { video, stream })
    }
}

/// Extrait la date d'expiration portée par l'URL de flux
///
/// Les URLs de flux du catalogue portent un paramètre `expire` (timestamp
/// Unix). En son absence, une validité courte par défaut est appliquée.
fn stream_expiry(url: &str) -> DateTime<Utc> {
    let parsed = url.split(['?', '&']).find_map(|part| {
        let ts = part.strip_prefix("expire=")?;
        ts.parse::<i64>().ok()
    });

    match parsed.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)) {
        Some(expiry) => expiry,
        None => Utc::now() + DEFAULT_STREAM_VALIDITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_expiry_from_url() {
        let url = "https://stream/abc?mime=audio%2Fmp4&expire=1893456000&sig=x";
        let expiry = stream_expiry(url);
        assert_eq!(expiry, DateTime::<Utc>::from_timestamp(1893456000, 0).unwrap());
    }

    #[test]
    fn test_stream_expiry_default() {
        let before = Utc::now();
        let expiry = stream_expiry("https://stream/abc");
        assert!(expiry >= before + DEFAULT_STREAM_VALIDITY - TimeDelta::seconds(5));
        assert!(expiry <= Utc::now() + DEFAULT_STREAM_VALIDITY);
    }
}
