use thiserror::Error;

use crate::ObjectId;

/// Erreurs de l'index de contenu.
#[derive(Error, Debug)]
pub enum IndexError {
    /// ObjectID jamais assigné, ou chemin devenu inaccessible
    #[error("No such object: {0}")]
    NotFound(ObjectId),

    /// Browse d'enfants sur un item
    #[error("Object {0} is not a container")]
    NotContainer(ObjectId),

    /// Chemin résolu hors de la racine servie (lien symbolique)
    #[error("Object {0} escapes the served directory")]
    OutsideRoot(ObjectId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
