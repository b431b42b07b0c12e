//! Système de cache en mémoire pour les données du catalogue
//!
//! Ce module fournit un cache en mémoire avec TTL pour minimiser les requêtes
//! aux API externes.

use crate::models::{AudioStream, VideoItem};
use chrono::{DateTime, Utc};
use moka::future::Cache as MokaCache;
use std::sync::Arc;
use std::time::Duration;

/// Entrée de cache pour un flux audio résolu
///
/// Les URLs de flux portent leur propre date d'expiration côté catalogue ;
/// `expires_at` est re-vérifié à la lecture en plus du TTL du cache.
#[derive(Debug, Clone)]
pub struct CachedStream {
    pub stream: AudioStream,
    pub expires_at: DateTime<Utc>,
}

/// Cache principal pour les données du catalogue
#[derive(Clone)]
pub struct TubeCache {
    /// Cache des résultats de recherche (TTL: 15 minutes par défaut)
    searches: Arc<MokaCache<String, Vec<VideoItem>>>,
    /// Cache des flux audio résolus (TTL: 5 minutes par défaut)
    streams: Arc<MokaCache<String, CachedStream>>,
}

impl TubeCache {
    /// Crée un nouveau cache avec les TTL par défaut
    pub fn new() -> Self {
        Self::with_ttls(Duration::from_secs(900), Duration::from_secs(300))
    }

    /// Crée un nouveau cache avec des TTL spécifiques
    pub fn with_ttls(search_ttl: Duration, stream_ttl: Duration) -> Self {
        Self {
            searches: Arc::new(
                MokaCache::builder()
                    .max_capacity(500)
                    .time_to_live(search_ttl)
                    .build(),
            ),
            streams: Arc::new(
                MokaCache::builder()
                    .max_capacity(250)
                    .time_to_live(stream_ttl)
                    .build(),
            ),
        }
    }

    // ============ Recherches ============

    /// Récupère un résultat de recherche depuis le cache
    pub async fn get_search(&self, query: &str) -> Option<Vec<VideoItem>> {
        self.searches.get(&normalize_query(query)).await
    }

    /// Ajoute un résultat de recherche au cache
    pub async fn put_search(&self, query: &str, videos: Vec<VideoItem>) {
        self.searches.insert(normalize_query(query), videos).await;
    }

    // ============ Flux audio ============

    /// Récupère un flux audio depuis le cache, s'il n'est pas expiré
    pub async fn get_stream(&self, video_id: &str) -> Option<CachedStream> {
        let entry = self.streams.get(video_id).await?;
        if entry.expires_at > Utc::now() {
            Some(entry)
        } else {
            None
        }
    }

    /// Ajoute un flux audio au cache
    pub async fn put_stream(&self, video_id: String, entry: CachedStream) {
        self.streams.insert(video_id, entry).await;
    }

    /// Invalide le flux d'une vidéo
    pub async fn invalidate_stream(&self, video_id: &str) {
        self.streams.invalidate(video_id).await;
    }
}

impl Default for TubeCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Clé de cache insensible à la casse et aux espaces périphériques
fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn stream(url: &str) -> AudioStream {
        AudioStream {
            url: url.to_string(),
            mime_type: "audio/mp4".to_string(),
            itag: 140,
            bitrate: None,
        }
    }

    #[tokio::test]
    async fn test_search_cache_roundtrip() {
        let cache = TubeCache::new();
        let videos = vec![VideoItem {
            id: "abc".into(),
            title: "Title".into(),
            channel_title: "Channel".into(),
            thumbnail_url: "thumb".into(),
        }];

        cache.put_search("  Lofi Beats ", videos.clone()).await;
        assert_eq!(cache.get_search("lofi beats").await, Some(videos));
    }

    #[tokio::test]
    async fn test_expired_stream_is_not_returned() {
        let cache = TubeCache::new();
        cache
            .put_stream(
                "abc".into(),
                CachedStream {
                    stream: stream("https://stream/abc"),
                    expires_at: Utc::now() - TimeDelta::seconds(1),
                },
            )
            .await;

        assert!(cache.get_stream("abc").await.is_none());
    }

    #[tokio::test]
    async fn test_fresh_stream_is_returned() {
        let cache = TubeCache::new();
        cache
            .put_stream(
                "abc".into(),
                CachedStream {
                    stream: stream("https://stream/abc"),
                    expires_at: Utc::now() + TimeDelta::seconds(60),
                },
            )
            .await;

        let entry = cache.get_stream("abc").await.expect("fresh entry");
        assert_eq!(entry.stream.url, "https://stream/abc");
    }
}
