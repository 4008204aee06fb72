//! # zcdupnp - Protocoles UPnP
//!
//! Ce crate regroupe les trois surfaces protocole du serveur :
//!
//! - [`ssdp`] : découverte SSDP (NOTIFY alive/byebye, réponses M-SEARCH)
//! - [`soap`] : parsing et construction d'enveloppes SOAP UPnP
//! - [`description`] : description du device racine et documents SCPD
//!
//! ## Constants UPnP
//!
//! - **Multicast** : 239.255.255.250:1900
//! - **Max-Age** : 1800 secondes, ré-annonce toutes les 900 secondes
//! - **Device type** : urn:schemas-upnp-org:device:MediaServer:1

pub mod description;
pub mod soap;
pub mod ssdp;

/// Type du device annoncé.
pub const MEDIA_SERVER_DEVICE_TYPE: &str = "urn:schemas-upnp-org:device:MediaServer:1";

/// URN du service ContentDirectory.
pub const CONTENT_DIRECTORY_SERVICE_TYPE: &str =
    "urn:schemas-upnp-org:service:ContentDirectory:1";

/// URN du service ConnectionManager.
pub const CONNECTION_MANAGER_SERVICE_TYPE: &str =
    "urn:schemas-upnp-org:service:ConnectionManager:1";
