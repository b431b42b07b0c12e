//! Couche d'accès aux API REST du catalogue vidéo
//!
//! Ce module fournit une interface bas-niveau pour communiquer avec les deux
//! endpoints externes : la recherche du catalogue et l'extraction des formats.

pub mod player;
pub mod search;

use crate::error::{Result, TubeError};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// URL de base de l'API de recherche du catalogue
const SEARCH_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// URL de base de l'API interne d'extraction des formats
const PLAYER_BASE_URL: &str = "https://www.youtube.com/youtubei/v1";

/// Client API bas-niveau pour communiquer avec le catalogue
pub struct TubeApi {
    /// Client HTTP
    client: Client,
    /// Clé d'API pour la recherche
    api_key: String,
    /// URL de base de la recherche (surchargée dans les tests)
    search_base_url: String,
    /// URL de base de l'extraction des formats (surchargée dans les tests)
    player_base_url: String,
}

impl TubeApi {
    /// Crée une nouvelle instance de l'API
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:67.0) Gecko/20100101 Firefox/67.0")
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            search_base_url: SEARCH_BASE_URL.to_string(),
            player_base_url: PLAYER_BASE_URL.to_string(),
        })
    }

    /// Crée une instance pointant vers des URLs de base arbitraires
    ///
    /// Utilisé par les tests d'intégration pour rediriger les requêtes vers
    /// un serveur mock.
    pub fn with_base_urls(
        api_key: impl Into<String>,
        search_base_url: impl Into<String>,
        player_base_url: impl Into<String>,
    ) -> Result<Self> {
        let mut api = Self::new(api_key)?;
        api.search_base_url = search_base_url.into();
        api.player_base_url = player_base_url.into();
        Ok(api)
    }

    /// Retourne la clé d'API
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Effectue une requête GET à l'API de recherche
    ///
    /// La clé d'API est ajoutée automatiquement aux paramètres.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.search_base_url, endpoint);

        debug!("GET {} with {} params", url, params.len());

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Effectue une requête POST JSON à l'API d'extraction des formats
    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> Result<T> {
        let url = format!("{}{}", self.player_base_url, endpoint);

        debug!("POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;
        self.handle_response(response).await
    }

    /// Traite la réponse HTTP
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        let status_code = status.as_u16();

        debug!("Response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("API error ({}): {}", status_code, error_text);
            return Err(TubeError::from_status_code(status_code, error_text));
        }

        let text = response.text().await?;

        // Vérifier si la réponse contient une erreur applicative
        if let Ok(json) = serde_json::from_str::<Value>(&text) {
            if let Some(error_obj) = json.get("error") {
                let code = error_obj
                    .get("code")
                    .and_then(|c| c.as_u64())
                    .unwrap_or(status_code as u64) as u16;
                let message = error_obj
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("Unknown error");
                warn!("Catalog API error: {}", message);
                return Err(TubeError::from_status_code(code, message));
            }
        }

        // Parser la réponse
        serde_json::from_str(&text).map_err(|e| {
            warn!("Failed to parse response: {}", e);
            TubeError::JsonParse(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_creation() {
        let api = TubeApi::new("test_key").unwrap();
        assert_eq!(api.api_key(), "test_key");
    }

    #[test]
    fn test_base_url_override() {
        let api =
            TubeApi::with_base_urls("test_key", "http://localhost:1", "http://localhost:2")
                .unwrap();
        assert_eq!(api.search_base_url, "http://localhost:1");
        assert_eq!(api.player_base_url, "http://localhost:2");
    }
}
