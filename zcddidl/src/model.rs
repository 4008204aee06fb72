//! Structures DIDL-Lite.

use serde::{Deserialize, Serialize};

/// Namespace racine DIDL-Lite.
pub const DIDL_XMLNS: &str = "urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/";

/// Namespace Dublin Core.
pub const DC_XMLNS: &str = "http://purl.org/dc/elements/1.1/";

/// Namespace UPnP.
pub const UPNP_XMLNS: &str = "urn:schemas-upnp-org:metadata-1-0/upnp/";

/// Namespace DLNA.
pub const DLNA_XMLNS: &str = "urn:schemas-dlna-org:metadata-1-0/";

/// Racine d'un document DIDL-Lite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename = "DIDL-Lite")]
pub struct DIDLLite {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "@xmlns:dc", skip_serializing_if = "Option::is_none")]
    pub xmlns_dc: Option<String>,

    #[serde(rename = "@xmlns:upnp", skip_serializing_if = "Option::is_none")]
    pub xmlns_upnp: Option<String>,

    #[serde(rename = "@xmlns:dlna", skip_serializing_if = "Option::is_none")]
    pub xmlns_dlna: Option<String>,

    #[serde(rename = "container", default)]
    pub containers: Vec<Container>,

    #[serde(rename = "item", default)]
    pub items: Vec<Item>,
}

impl DIDLLite {
    /// Document vide avec les namespaces standard.
    pub fn new() -> Self {
        Self {
            xmlns: DIDL_XMLNS.to_string(),
            xmlns_dc: Some(DC_XMLNS.to_string()),
            xmlns_upnp: Some(UPNP_XMLNS.to_string()),
            xmlns_dlna: Some(DLNA_XMLNS.to_string()),
            containers: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Nombre d'éléments au premier niveau du document.
    pub fn len(&self) -> usize {
        self.containers.len() + self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sérialise le document en XML.
    pub fn to_xml(&self) -> Result<String, quick_xml::SeError> {
        quick_xml::se::to_string(self)
    }

    /// Parse un document DIDL-Lite.
    pub fn parse(input: &str) -> Result<Self, quick_xml::DeError> {
        quick_xml::de::from_str(input)
    }
}

impl Default for DIDLLite {
    fn default() -> Self {
        Self::new()
    }
}

/// Container navigable (répertoire).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@parentID")]
    pub parent_id: String,

    #[serde(rename = "@restricted")]
    pub restricted: String,

    #[serde(rename = "@childCount", skip_serializing_if = "Option::is_none")]
    pub child_count: Option<String>,

    #[serde(rename = "dc:title", alias = "title")]
    pub title: String,

    #[serde(rename = "upnp:class", alias = "class")]
    pub class: String,
}

/// Item média (fichier vidéo, audio ou image).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@parentID")]
    pub parent_id: String,

    #[serde(rename = "@restricted")]
    pub restricted: String,

    #[serde(rename = "dc:title", alias = "title")]
    pub title: String,

    #[serde(rename = "upnp:class", alias = "class")]
    pub class: String,

    #[serde(
        rename = "dc:date",
        alias = "date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,

    #[serde(rename = "res", default)]
    pub resources: Vec<Resource>,
}

/// Ressource média pointant vers le serveur HTTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "@protocolInfo")]
    pub protocol_info: String,

    #[serde(rename = "@size", skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(rename = "@duration", skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(rename = "$text")]
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_didl() {
        let xml = r#"
        <DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"
                   xmlns:dc="http://purl.org/dc/elements/1.1/"
                   xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/">
            <item id="7" parentID="0" restricted="1">
                <dc:title>movie.mp4</dc:title>
                <upnp:class>object.item.videoItem</upnp:class>
                <res protocolInfo="http-get:*:video/mp4:*" size="10">http://10.0.0.2:8200/media/7/movie.mp4</res>
            </item>
        </DIDL-Lite>
        "#;

        let didl = DIDLLite::parse(xml).unwrap();
        assert_eq!(didl.items.len(), 1);
        assert_eq!(didl.items[0].title, "movie.mp4");
        assert_eq!(didl.items[0].resources[0].size.as_deref(), Some("10"));
    }

    #[test]
    fn test_serialize_escapes_titles() {
        let mut didl = DIDLLite::new();
        didl.items.push(Item {
            id: "3".to_string(),
            parent_id: "0".to_string(),
            restricted: "1".to_string(),
            title: "Tom & Jerry <remastered>.mkv".to_string(),
            class: "object.item.videoItem".to_string(),
            date: None,
            resources: vec![],
        });

        let xml = didl.to_xml().unwrap();
        assert!(xml.contains("Tom &amp; Jerry &lt;remastered&gt;.mkv"));
        assert!(!xml.contains("Tom & Jerry"));
    }

    #[test]
    fn test_roundtrip_container() {
        let mut didl = DIDLLite::new();
        didl.containers.push(Container {
            id: "0".to_string(),
            parent_id: "-1".to_string(),
            restricted: "1".to_string(),
            child_count: Some("2".to_string()),
            title: "Media".to_string(),
            class: "object.container".to_string(),
        });

        let xml = didl.to_xml().unwrap();
        let parsed = DIDLLite::parse(&xml).unwrap();
        assert_eq!(parsed.containers.len(), 1);
        assert_eq!(parsed.containers[0].parent_id, "-1");
        assert_eq!(parsed.containers[0].child_count.as_deref(), Some("2"));
    }
}
