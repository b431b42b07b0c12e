//! Structures de données pour représenter les objets du catalogue vidéo

use serde::{Deserialize, Serialize};

/// Représente une vidéo retournée par la recherche du catalogue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoItem {
    /// Identifiant opaque de la vidéo
    pub id: String,
    /// Titre affichable
    pub title: String,
    /// Nom de la chaîne
    pub channel_title: String,
    /// URL de la vignette
    pub thumbnail_url: String,
}

/// Représente un format audio seul, directement lisible par un lecteur
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AudioStream {
    /// URL directement consommable par le lecteur
    pub url: String,
    /// Type MIME (ex: "audio/webm; codecs=\"opus\"")
    pub mime_type: String,
    /// Identifiant du format côté catalogue
    pub itag: u32,
    /// Débit en bits/s si connu
    #[serde(default)]
    pub bitrate: Option<u64>,
}

/// Résultat complet d'une résolution : la vidéo retenue et son flux audio
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedMedia {
    /// Meilleur résultat de la recherche
    pub video: VideoItem,
    /// Premier format audio seul de la liste classée par le catalogue
    pub stream: AudioStream,
}
