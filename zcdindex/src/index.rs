//! Index principal : bijection ObjectID ⇄ chemin et énumération.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::errors::IndexError;
use crate::mime::classify_extension;
use crate::object::{ContentObject, ObjectId, ObjectKind};

/// Index de contenu du répertoire servi.
///
/// Les deux tables (ID → chemin et chemin → ID) sont mises à jour ensemble
/// sous le même verrou en écriture ; l'assignation d'ID est donc sérialisée
/// alors que les lectures peuvent se faire en parallèle.
pub struct ContentIndex {
    /// Racine servie, résolue (liens symboliques inclus) à la construction
    root: PathBuf,

    maps: RwLock<IndexMaps>,

    /// Compteur global retourné comme UpdateID par ContentDirectory.
    /// Incrémenté quand une relecture paresseuse découvre de nouveaux enfants.
    update_id: AtomicU32,
}

struct IndexMaps {
    by_id: HashMap<ObjectId, PathBuf>,
    by_path: HashMap<PathBuf, ObjectId>,
    next_id: ObjectId,
}

impl ContentIndex {
    /// Crée l'index et enregistre la racine sous l'ID 0.
    pub fn new(root: &Path) -> Result<Self, IndexError> {
        let root = root.canonicalize()?;

        let mut by_id = HashMap::new();
        let mut by_path = HashMap::new();
        by_id.insert(0, root.clone());
        by_path.insert(root.clone(), 0);

        Ok(Self {
            root,
            maps: RwLock::new(IndexMaps {
                by_id,
                by_path,
                next_id: 1,
            }),
            update_id: AtomicU32::new(0),
        })
    }

    /// Racine servie (chemin canonique).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Valeur courante du compteur UpdateID.
    pub fn update_id(&self) -> u32 {
        self.update_id.load(Ordering::Relaxed)
    }

    /// Résout un ObjectID vers son chemin.
    ///
    /// Le mapping survit à la disparition du fichier : l'appelant découvre
    /// l'absence au moment de l'ouverture.
    pub fn lookup(&self, id: ObjectId) -> Result<PathBuf, IndexError> {
        let maps = self.maps.read().unwrap();
        maps.by_id.get(&id).cloned().ok_or(IndexError::NotFound(id))
    }

    /// Résout un ObjectID en chemin réel, vérifié confiné à la racine.
    ///
    /// Les liens symboliques sont résolus avant la vérification : un lien qui
    /// pointe hors du répertoire servi est rejeté. Les chemins contenant des
    /// caractères de contrôle sont rejetés aussi.
    pub fn resolve_safe(&self, id: ObjectId) -> Result<PathBuf, IndexError> {
        let path = self.lookup(id)?;

        if path.to_string_lossy().chars().any(char::is_control) {
            return Err(IndexError::NotFound(id));
        }

        let real = path.canonicalize().map_err(|_| IndexError::NotFound(id))?;
        if !real.starts_with(&self.root) {
            return Err(IndexError::OutsideRoot(id));
        }

        Ok(real)
    }

    /// Record complet d'un objet connu, pour BrowseMetadata.
    pub fn metadata(&self, id: ObjectId) -> Result<ContentObject, IndexError> {
        let path = self.lookup(id)?;
        let meta = fs::metadata(&path).map_err(|_| IndexError::NotFound(id))?;

        let parent_id = if id == 0 { None } else { Some(self.parent_of(&path)) };
        let title = display_name(&path);

        if meta.is_dir() {
            Ok(ContentObject {
                id,
                parent_id,
                kind: ObjectKind::Container {
                    child_count: count_visible_children(&path),
                },
                title,
                path,
            })
        } else {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            let (mime_type, class) =
                classify_extension(ext).ok_or(IndexError::NotFound(id))?;
            Ok(ContentObject {
                id,
                parent_id: parent_id.or(Some(0)),
                kind: ObjectKind::Item {
                    mime_type,
                    class,
                    size: meta.len(),
                    last_modified: mtime(&meta),
                },
                title,
                path,
            })
        }
    }

    /// Liste les enfants directs d'un container, avec pagination.
    ///
    /// # Arguments
    ///
    /// * `id` - ObjectID du container
    /// * `offset` - Nombre d'enfants à sauter
    /// * `limit` - Taille maximale de la fenêtre (`usize::MAX` = tout)
    ///
    /// # Returns
    ///
    /// La fenêtre d'enfants et le total ignorant la fenêtre, dont les clients
    /// dépendent pour la pagination.
    pub fn list(
        &self,
        id: ObjectId,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<ContentObject>, u32), IndexError> {
        let path = self.lookup(id)?;
        let meta = fs::metadata(&path).map_err(|_| IndexError::NotFound(id))?;
        if !meta.is_dir() {
            return Err(IndexError::NotContainer(id));
        }

        // Relecture du répertoire : containers d'abord, tri insensible à la
        // casse dans chaque groupe, déterministe entre deux appels.
        let mut dirs: Vec<PathBuf> = Vec::new();
        let mut files: Vec<PathBuf> = Vec::new();

        for entry in fs::read_dir(&path)? {
            let Ok(entry) = entry else { continue };
            let child = entry.path();
            let name = display_name(&child);
            if name.starts_with('.') {
                continue;
            }

            // fs::metadata suit les liens symboliques ; un lien cassé disparaît
            let Ok(child_meta) = fs::metadata(&child) else { continue };

            if child_meta.is_dir() {
                dirs.push(child);
            } else if child_meta.is_file() {
                let ext = child.extension().and_then(|e| e.to_str()).unwrap_or("");
                if classify_extension(ext).is_some() {
                    files.push(child);
                }
            }
        }

        sort_by_title(&mut dirs);
        sort_by_title(&mut files);

        let children: Vec<PathBuf> = dirs.into_iter().chain(files).collect();
        let total = children.len() as u32;

        // Assignation des IDs manquants, sérialisée sous le verrou en écriture
        let assigned: Vec<ObjectId> = {
            let mut maps = self.maps.write().unwrap();
            let mut fresh = 0u32;
            let ids = children
                .iter()
                .map(|child| {
                    if let Some(existing) = maps.by_path.get(child).copied() {
                        existing
                    } else {
                        let new_id = maps.next_id;
                        maps.next_id += 1;
                        maps.by_id.insert(new_id, child.clone());
                        maps.by_path.insert(child.clone(), new_id);
                        fresh += 1;
                        new_id
                    }
                })
                .collect();

            if fresh > 0 {
                let update = self.update_id.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(container = id, fresh, update, "assigned new object ids");
            }
            ids
        };

        let window = children
            .into_iter()
            .zip(assigned)
            .skip(offset)
            .take(limit)
            .filter_map(|(child, child_id)| self.classify(child_id, id, child))
            .collect();

        Ok((window, total))
    }

    /// Construit le record encodeur d'un enfant déjà indexé.
    fn classify(
        &self,
        id: ObjectId,
        parent_id: ObjectId,
        path: PathBuf,
    ) -> Option<ContentObject> {
        let meta = fs::metadata(&path).ok()?;
        let title = display_name(&path);

        let kind = if meta.is_dir() {
            ObjectKind::Container {
                child_count: count_visible_children(&path),
            }
        } else {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            let (mime_type, class) = classify_extension(ext)?;
            ObjectKind::Item {
                mime_type,
                class,
                size: meta.len(),
                last_modified: mtime(&meta),
            }
        };

        Some(ContentObject {
            id,
            parent_id: Some(parent_id),
            kind,
            title,
            path,
        })
    }

    /// ID du container parent d'un chemin indexé ; 0 par défaut.
    fn parent_of(&self, path: &Path) -> ObjectId {
        let maps = self.maps.read().unwrap();
        path.parent()
            .and_then(|p| maps.by_path.get(p))
            .copied()
            .unwrap_or(0)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn sort_by_title(paths: &mut [PathBuf]) {
    paths.sort_by_key(|p| {
        let name = display_name(p);
        (name.to_lowercase(), name)
    });
}

fn mtime(meta: &fs::Metadata) -> Option<DateTime<Utc>> {
    meta.modified().ok().map(DateTime::<Utc>::from)
}

/// Compte les enfants visibles d'un répertoire (sous-répertoires et fichiers
/// dont l'extension est supportée).
fn count_visible_children(path: &Path) -> u32 {
    let Ok(entries) = fs::read_dir(path) else { return 0 };

    let mut count = 0;
    for entry in entries.flatten() {
        let child = entry.path();
        if display_name(&child).starts_with('.') {
            continue;
        }
        let Ok(meta) = fs::metadata(&child) else { continue };
        if meta.is_dir() {
            count += 1;
        } else if meta.is_file() {
            let ext = child.extension().and_then(|e| e.to_str()).unwrap_or("");
            if classify_extension(ext).is_some() {
                count += 1;
            }
        }
    }
    count
}
