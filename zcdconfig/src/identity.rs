//! Identité UPnP du device.

use std::net::IpAddr;
use std::path::Path;

use uuid::Uuid;
use zcdutils::{guess_local_ip, short_hostname};

use crate::{ServerConfig, SERVER_MANUFACTURER, SERVER_VERSION};

/// Identité immuable du device, construite une fois au démarrage.
///
/// L'UDN est dérivé (UUID v5) du couple hostname + répertoire servi : le même
/// répertoire sur la même machine redonne le même UDN après redémarrage, donc
/// les clients retrouvent un device connu sans fichier d'état.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    /// UDN complet, préfixe `uuid:` inclus
    pub udn: String,

    /// Nom affiché aux utilisateurs
    pub friendly_name: String,

    /// Fabricant (description + header SERVER)
    pub manufacturer: String,

    /// Nom du modèle
    pub model_name: String,

    /// Numéro de version du modèle
    pub model_number: String,

    /// Adresse IPv4 annoncée
    pub bind_ip: IpAddr,

    /// Port HTTP
    pub port: u16,
}

impl DeviceIdentity {
    /// Construit l'identité à partir de la configuration validée.
    pub fn from_config(config: &ServerConfig) -> Self {
        let host = short_hostname();
        let bind_ip = config.bind_ip.unwrap_or_else(guess_local_ip);

        let friendly_name = config
            .server_name
            .clone()
            .unwrap_or_else(|| format!("ZeroConfigDLNA on {host}"));

        Self {
            udn: derive_udn(&host, &config.directory),
            friendly_name,
            manufacturer: SERVER_MANUFACTURER.to_string(),
            model_name: "ZeroConfigDLNA".to_string(),
            model_number: SERVER_VERSION.to_string(),
            bind_ip,
            port: config.port,
        }
    }

    /// URL de base du serveur HTTP, slash final inclus.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}/", self.bind_ip, self.port)
    }

    /// URL `LOCATION` annoncée en SSDP.
    pub fn location(&self) -> String {
        format!("{}description.xml", self.base_url())
    }

    /// Valeur du header `SERVER` (HTTP et SSDP).
    pub fn server_agent(&self) -> String {
        format!("ZeroConfigDLNA/{} UPnP/1.0 DLNA/1.50", self.model_number)
    }
}

/// Dérive un UDN stable `uuid:<v5>` depuis le hostname et le chemin servi.
fn derive_udn(host: &str, directory: &Path) -> String {
    let canonical = directory
        .canonicalize()
        .unwrap_or_else(|_| directory.to_path_buf());
    let name = format!("{}:{}", host, canonical.display());
    let uuid = Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes());
    format!("uuid:{uuid}")
}
