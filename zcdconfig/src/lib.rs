//! # zcdconfig - Configuration et identité
//!
//! Ce crate définit les deux enregistrements immuables construits au démarrage
//! et partagés par référence avec tous les composants :
//!
//! - [`ServerConfig`] : la configuration fournie par le front-end CLI
//! - [`DeviceIdentity`] : l'identité UPnP du device (UDN, friendly name, URLs)
//!
//! Aucun état global : les enregistrements sont passés aux constructeurs, ce
//! qui permet de faire tourner plusieurs serveurs dans un même process de test.

mod errors;
mod identity;

pub use errors::ConfigError;
pub use identity::DeviceIdentity;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

/// Version publiée du serveur, utilisée dans la description et l'agent SSDP.
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fabricant affiché dans la description du device.
pub const SERVER_MANUFACTURER: &str = "richstokes";

/// Configuration de démarrage consommée depuis le CLI.
///
/// Tous les champs ont une valeur par défaut raisonnable : pointer le serveur
/// sur un répertoire et le lancer doit suffire.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Répertoire servi (défaut : répertoire courant)
    pub directory: PathBuf,

    /// Port HTTP (défaut : 8200)
    pub port: u16,

    /// Logging verbeux
    pub verbose: bool,

    /// Adresse IPv4 annoncée ; `None` = auto-détection
    pub bind_ip: Option<IpAddr>,

    /// Friendly name ; `None` = `ZeroConfigDLNA on <hostname>`
    pub server_name: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            directory: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            port: 8200,
            verbose: false,
            bind_ip: None,
            server_name: None,
        }
    }
}

impl ServerConfig {
    /// Valide la configuration avant tout démarrage.
    ///
    /// # Returns
    ///
    /// `Ok(())` si la configuration est utilisable, sinon le [`ConfigError`]
    /// qui détermine le code de sortie du process.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }

        if !self.directory.exists() {
            return Err(ConfigError::DirectoryMissing(self.directory.clone()));
        }

        if !self.directory.is_dir() {
            return Err(ConfigError::NotADirectory(self.directory.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.port, 8200);
    }

    #[test]
    fn test_zero_port_rejected() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPort(0))
        ));
    }

    #[test]
    fn test_missing_directory_rejected() {
        let config = ServerConfig {
            directory: PathBuf::from("/nonexistent/zcd-test-dir"),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = ServerConfig {
            directory: file.path().to_path_buf(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotADirectory(_))
        ));
    }
}
