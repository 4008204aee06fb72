//! # zcddidl - DIDL-Lite
//!
//! Modèle et sérialisation du vocabulaire DIDL-Lite utilisé par le service
//! ContentDirectory.
//!
//! ## Fonctionnalités
//!
//! - ✅ Structures sérialisables container/item/res (serde + quick-xml)
//! - ✅ Construction depuis les [`ContentObject`] de l'index
//! - ✅ URLs de ressources `media/<id>/<titre-encodé>`
//! - ✅ protocolInfo DLNA compatible Samsung/Sony
//! - ✅ Parsing inverse pour les tests

mod encode;
mod model;

pub use encode::{didl_container, didl_item, protocol_info, resource_url, PROTOCOL_FEATURES};
pub use model::{Container, DIDLLite, Item, Resource};
