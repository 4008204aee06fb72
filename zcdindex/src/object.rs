//! Objets de contenu échangés entre l'index et l'encodeur.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::mime::MediaClass;

/// Identifiant entier d'un objet navigable ; 0 est la racine.
pub type ObjectId = u64;

/// Nature d'un objet : container (répertoire) ou item (fichier média).
#[derive(Debug, Clone)]
pub enum ObjectKind {
    Container {
        /// Nombre d'enfants visibles, calculé à la demande
        child_count: u32,
    },
    Item {
        mime_type: &'static str,
        class: MediaClass,
        size: u64,
        last_modified: Option<DateTime<Utc>>,
    },
}

/// Unité échangée entre l'index et l'encodeur DIDL-Lite.
#[derive(Debug, Clone)]
pub struct ContentObject {
    pub id: ObjectId,

    /// `None` pour la racine, dont le parentID DIDL vaut -1
    pub parent_id: Option<ObjectId>,

    pub kind: ObjectKind,

    /// Nom du fichier ou du répertoire
    pub title: String,

    /// Chemin résolu dans l'arborescence servie
    pub path: PathBuf,
}

impl ContentObject {
    pub fn is_container(&self) -> bool {
        matches!(self.kind, ObjectKind::Container { .. })
    }

    /// parentID au format DIDL : `-1` pour la racine.
    pub fn didl_parent_id(&self) -> String {
        match self.parent_id {
            Some(id) => id.to_string(),
            None => "-1".to_string(),
        }
    }
}
