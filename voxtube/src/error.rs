//! Gestion des erreurs pour le client du catalogue vidéo

use thiserror::Error;

/// Type Result personnalisé pour voxtube
pub type Result<T> = std::result::Result<T, TubeError>;

/// Erreurs possibles lors de la résolution d'un flux audio
#[derive(Error, Debug)]
pub enum TubeError {
    /// Erreur HTTP
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Erreur de parsing JSON
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Erreur de configuration (anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Clé d'API absente ou invalide
    #[error("Catalog API key error: {0}")]
    ApiKey(String),

    /// Erreur de l'API du catalogue
    #[error("Catalog API error (code {code}): {message}")]
    ApiError { code: u16, message: String },

    /// Quota dépassé
    #[error("API quota exceeded, please try again later")]
    QuotaExceeded,

    /// Ressource non trouvée (vidéo retirée, etc.)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// La recherche n'a retourné aucun résultat exploitable
    #[error("No result for query '{0}'")]
    NoResults(String),

    /// La vidéo retenue n'expose aucun format audio seul
    #[error("No audio-only format available for video {0}")]
    NoAudioFormat(String),

    /// La vidéo n'est pas lisible (restriction, géo-blocage, etc.)
    #[error("Video is not playable: {0}")]
    NotPlayable(String),

    /// Erreur générique
    #[error("Tube error: {0}")]
    Other(String),
}

impl TubeError {
    /// Crée une erreur API depuis un code de statut HTTP et un message
    pub fn from_status_code(code: u16, message: impl Into<String>) -> Self {
        match code {
            401 => Self::ApiKey(message.into()),
            403 => Self::QuotaExceeded,
            404 => Self::NotFound(message.into()),
            _ => Self::ApiError {
                code,
                message: message.into(),
            },
        }
    }

    /// Vérifie si l'erreur est une erreur de quota
    pub fn is_quota(&self) -> bool {
        matches!(self, TubeError::QuotaExceeded)
    }

    /// Vérifie si l'erreur correspond à une recherche sans résultat
    pub fn is_no_results(&self) -> bool {
        matches!(self, TubeError::NoResults(_))
    }
}
