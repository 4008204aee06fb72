//! # zcdindex - Index de contenu
//!
//! Ce crate matérialise l'arborescence servie comme un espace d'ObjectID
//! entiers stables, consommé par l'encodeur DIDL-Lite et le serveur HTTP.
//!
//! ## Fonctionnalités
//!
//! - ✅ Bijection ObjectID ⇄ chemin, stable pour la durée du process
//! - ✅ Énumération paginée des enfants d'un container
//! - ✅ Classification MIME / classe UPnP par extension
//! - ✅ Création paresseuse des IDs au premier browse du parent
//! - ✅ Compteur UpdateID global pour ContentDirectory
//!
//! ## Invariants
//!
//! - L'ID 0 est réservé au container racine (le répertoire servi)
//! - Un ID assigné n'est jamais recyclé ni remappé
//! - Les enfants sont triés containers d'abord, puis ordre lexicographique
//!   insensible à la casse sur le titre

mod errors;
mod index;
mod mime;
mod object;

pub use errors::IndexError;
pub use index::ContentIndex;
pub use mime::{classify_extension, supported_mime_types, MediaClass};
pub use object::{ContentObject, ObjectId, ObjectKind};
