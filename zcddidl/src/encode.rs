//! Construction des fragments DIDL-Lite depuis les objets de l'index.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use zcdindex::{ContentObject, ObjectKind};

use crate::model::{Container, Item, Resource};

/// Attributs DLNA du quatrième champ protocolInfo.
///
/// OP=01 annonce le streaming par byte-range, CI=0 l'absence de conversion,
/// et le masque FLAGS les modes streaming + background. Ces littéraux exacts
/// conditionnent la compatibilité des clients Samsung et Sony.
pub const PROTOCOL_FEATURES: &str =
    "DLNA.ORG_OP=01;DLNA.ORG_CI=0;DLNA.ORG_FLAGS=01700000000000000000000000000000";

/// Caractères encodés dans le segment titre des URLs de ressources.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'\\');

/// protocolInfo complet pour un type MIME.
pub fn protocol_info(mime_type: &str) -> String {
    format!("http-get:*:{mime_type}:{PROTOCOL_FEATURES}")
}

/// URL de la ressource d'un item.
///
/// Le segment titre est purement indicatif : le serveur résout par l'ID.
pub fn resource_url(base_url: &str, id: u64, title: &str) -> String {
    let encoded = utf8_percent_encode(title, PATH_SEGMENT);
    format!("{base_url}media/{id}/{encoded}")
}

/// Encode un container de l'index en élément DIDL.
pub fn didl_container(obj: &ContentObject) -> Container {
    let child_count = match obj.kind {
        ObjectKind::Container { child_count } => Some(child_count.to_string()),
        _ => None,
    };

    Container {
        id: obj.id.to_string(),
        parent_id: obj.didl_parent_id(),
        restricted: "1".to_string(),
        child_count,
        title: obj.title.clone(),
        class: "object.container".to_string(),
    }
}

/// Encode un item de l'index en élément DIDL.
///
/// # Returns
///
/// `None` si l'objet n'est pas un item.
pub fn didl_item(obj: &ContentObject, base_url: &str) -> Option<Item> {
    let ObjectKind::Item {
        mime_type,
        class,
        size,
        last_modified,
    } = &obj.kind
    else {
        return None;
    };

    Some(Item {
        id: obj.id.to_string(),
        parent_id: obj.didl_parent_id(),
        restricted: "1".to_string(),
        title: obj.title.clone(),
        class: class.upnp_class().to_string(),
        date: last_modified
            .as_ref()
            .map(|m| m.format("%Y-%m-%dT%H:%M:%S").to_string()),
        resources: vec![Resource {
            protocol_info: protocol_info(mime_type),
            size: Some(size.to_string()),
            duration: None,
            url: resource_url(base_url, obj.id, &obj.title),
        }],
    })
}
