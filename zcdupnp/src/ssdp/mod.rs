//! # Module SSDP - Simple Service Discovery Protocol
//!
//! Découverte automatique du MediaServer sur le lien local.
//!
//! ## Fonctionnalités
//!
//! - ✅ Rafale de NOTIFY alive au démarrage (3 envois espacés de 200 ms)
//! - ✅ Ré-annonces périodiques toutes les max-age/2 secondes
//! - ✅ Réponses unicast aux M-SEARCH, étalées aléatoirement dans [0, MX]
//! - ✅ NOTIFY byebye à l'arrêt
//!
//! ## Constants SSDP
//!
//! - **Multicast Address** : 239.255.255.250:1900
//! - **Max-Age** : 1800 secondes (30 minutes)
//! - **TTL multicast** : 2

mod device;
mod server;

pub use device::SsdpDevice;
pub use server::SsdpServer;

use std::net::Ipv4Addr;

/// Adresse du groupe multicast SSDP.
pub const SSDP_MULTICAST_ADDR: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);

/// Port SSDP.
pub const SSDP_PORT: u16 = 1900;

/// Durée de validité des annonces (secondes).
pub const MAX_AGE: u32 = 1800;
