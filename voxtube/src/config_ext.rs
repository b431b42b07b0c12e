//! Extension pour intégrer la configuration du catalogue dans voxconfig
//!
//! Ce module fournit le trait `TubeConfigExt` qui permet d'ajouter facilement
//! des méthodes de gestion de la clé d'API du catalogue à voxconfig::Config.

use anyhow::{Result, anyhow};
use serde_yaml::Value;
use voxconfig::Config;

/// Trait d'extension pour gérer la configuration du catalogue dans voxconfig
///
/// # Exemple
///
/// ```rust,ignore
/// use voxconfig::get_config;
/// use voxtube::TubeConfigExt;
///
/// let config = get_config();
/// let api_key = config.get_tube_api_key()?;
/// ```
pub trait TubeConfigExt {
    /// Récupère la clé d'API du catalogue depuis la configuration
    ///
    /// # Errors
    ///
    /// Retourne une erreur si la clé n'est pas configurée. L'absence de clé
    /// est une condition fatale au démarrage, jamais une erreur par requête.
    fn get_tube_api_key(&self) -> Result<String>;

    /// Définit la clé d'API du catalogue dans la configuration
    fn set_tube_api_key(&self, api_key: &str) -> Result<()>;
}

impl TubeConfigExt for Config {
    fn get_tube_api_key(&self) -> Result<String> {
        match self.get_value(&["accounts", "tube", "api_key"]) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => Err(anyhow!(
                "Catalog API key not configured (accounts.tube.api_key)"
            )),
        }
    }

    fn set_tube_api_key(&self, api_key: &str) -> Result<()> {
        self.set_value(
            &["accounts", "tube", "api_key"],
            Value::String(api_key.to_string()),
        )
    }
}
