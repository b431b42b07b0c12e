//! Recherche dans le catalogue vidéo
//!
//! L'API retourne les résultats déjà classés par pertinence : le premier
//! élément de la liste est le meilleur candidat.

use super::TubeApi;
use crate::error::Result;
use crate::models::VideoItem;
use serde::Deserialize;
use tracing::debug;

/// Réponse de l'endpoint /search
#[derive(Debug, Deserialize)]
pub(crate) struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

/// Un résultat de recherche
#[derive(Debug, Deserialize)]
pub(crate) struct SearchItem {
    id: SearchItemId,
    #[serde(default)]
    snippet: Option<Snippet>,
}

/// Identifiant du résultat (seuls les résultats de type vidéo portent un videoId)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchItemId {
    #[serde(default)]
    video_id: Option<String>,
}

/// Métadonnées affichables du résultat
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Snippet {
    title: String,
    channel_title: String,
    #[serde(default)]
    thumbnails: Option<Thumbnails>,
}

/// Vignettes disponibles, par taille
#[derive(Debug, Deserialize)]
pub(crate) struct Thumbnails {
    #[serde(default)]
    high: Option<Thumbnail>,
    #[serde(default)]
    medium: Option<Thumbnail>,
    #[serde(default)]
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thumbnail {
    url: String,
}

impl Thumbnails {
    /// Retourne la meilleure vignette disponible
    fn best(&self) -> Option<&str> {
        self.high
            .as_ref()
            .or(self.medium.as_ref())
            .or(self.default.as_ref())
            .map(|t| t.url.as_str())
    }
}

/// URL de vignette de repli construite depuis l'identifiant vidéo
fn fallback_thumbnail(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id)
}

impl TubeApi {
    /// Recherche des vidéos dans le catalogue
    ///
    /// Les résultats sont retournés dans l'ordre de pertinence du catalogue.
    /// Les résultats sans identifiant vidéo ou sans métadonnées sont ignorés.
    pub async fn search_videos(&self, query: &str, max_results: u32) -> Result<Vec<VideoItem>> {
        debug!("Searching catalog for '{}'", query);

        let max_results = max_results.to_string();
        let params = [
            ("part", "snippet"),
            ("type", "video"),
            ("maxResults", max_results.as_str()),
            ("q", query),
        ];

        let response: SearchListResponse = self.get("/search", &params).await?;

        let videos = response
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                let snippet = item.snippet?;
                let thumbnail_url = snippet
                    .thumbnails
                    .as_ref()
                    .and_then(Thumbnails::best)
                    .map(str::to_string)
                    .unwrap_or_else(|| fallback_thumbnail(&video_id));

                Some(VideoItem {
                    id: video_id,
                    title: snippet.title,
                    channel_title: snippet.channel_title,
                    thumbnail_url,
                })
            })
            .collect();

        Ok(videos)
    }
}
