//! # zcdutils - Utilitaires partagés
//!
//! Petites fonctions réseau utilisées par les autres crates du workspace.

mod ip_utils;

pub use ip_utils::{guess_local_ip, short_hostname};
