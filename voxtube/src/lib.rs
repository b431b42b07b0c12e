//! # voxtube - Résolution de flux audio pour VoxTube
//!
//! Cette crate transforme une requête parlée en un flux audio directement
//! lisible par un lecteur. Elle enveloppe deux appels externes (la recherche
//! dans le catalogue vidéo et l'extraction des formats de streaming) derrière
//! une seule opération `resolve()` avec un seul mode d'échec.
//!
//! ## Vue d'ensemble
//!
//! - Recherche du meilleur résultat pour une requête libre (le premier de la
//!   liste classée par le catalogue, sans désambiguïsation)
//! - Sélection du meilleur format audio seul (le premier de la liste audio
//!   déjà classée fournie par le catalogue)
//! - Cache en mémoire avec TTL pour minimiser les requêtes API
//! - Repli des échecs de recherche sur "aucun résultat" : les deux cas sont
//!   le même mode d'échec pour l'appelant
//!
//! ## Structure des modules
//!
//! ```text
//! voxtube/
//! ├── src/
//! │   ├── lib.rs              # Module principal (ce fichier)
//! │   ├── client.rs           # Client haut-niveau avec cache
//! │   ├── models.rs           # Structures de données
//! │   ├── api/
//! │   │   ├── mod.rs          # Client API bas-niveau
//! │   │   ├── search.rs       # Recherche du catalogue
//! │   │   └── player.rs       # Extraction des formats
//! │   ├── cache.rs            # Cache en mémoire
//! │   ├── config_ext.rs       # Extension voxconfig
//! │   └── error.rs            # Gestion des erreurs
//! ```
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use voxtube::TubeClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Utilise automatiquement la config depuis voxconfig
//!     let client = TubeClient::from_config()?;
//!
//!     let media = client.resolve("lofi beats").await?;
//!     println!("{} -> {}", media.video.title, media.stream.url);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod client;
pub mod config_ext;
pub mod error;
pub mod models;

pub use cache::TubeCache;
pub use client::TubeClient;
pub use config_ext::TubeConfigExt;
pub use error::{Result, TubeError};
pub use models::{AudioStream, ResolvedMedia, VideoItem};
