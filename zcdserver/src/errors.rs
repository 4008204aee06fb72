use thiserror::Error;

/// Erreurs fatales du serveur, remontées au CLI.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Port {0} is already in use")]
    PortInUse(u16),

    #[error("SSDP multicast setup failed: {0}")]
    Multicast(std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Index error: {0}")]
    Index(#[from] zcdindex::IndexError),
}

impl ServerError {
    /// Code de sortie du process : 3 pour un port occupé, 1 sinon.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PortInUse(_) => 3,
            _ => 1,
        }
    }
}
