use std::path::PathBuf;
use thiserror::Error;

/// Erreurs de configuration fatales.
///
/// Chaque variante correspond à un code de sortie du process, remonté par le
/// CLI via [`ConfigError::exit_code`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port: {0} (must be in 1..=65535)")]
    InvalidPort(u16),

    #[error("Media directory does not exist: {0}")]
    DirectoryMissing(PathBuf),

    #[error("Media path is not a directory: {0}")]
    NotADirectory(PathBuf),
}

impl ConfigError {
    /// Code de sortie associé : 2 pour une configuration invalide,
    /// 4 pour un répertoire servi absent ou invalide.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidPort(_) => 2,
            Self::DirectoryMissing(_) | Self::NotADirectory(_) => 4,
        }
    }
}
