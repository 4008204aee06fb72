//! Table de classification MIME.
//!
//! La table est l'autorité pour l'encodeur DIDL-Lite et le serveur HTTP :
//! un fichier dont l'extension n'y figure pas est invisible au browse.

/// Classe média UPnP d'un item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaClass {
    Video,
    Audio,
    Image,
}

impl MediaClass {
    /// Classe UPnP complète pour l'élément `<upnp:class>`.
    pub fn upnp_class(&self) -> &'static str {
        match self {
            MediaClass::Video => "object.item.videoItem",
            MediaClass::Audio => "object.item.audioItem.musicTrack",
            MediaClass::Image => "object.item.imageItem.photo",
        }
    }
}

/// Classifie une extension de fichier (insensible à la casse).
///
/// # Returns
///
/// `Some((mime_type, classe))` pour une extension supportée, `None` sinon.
pub fn classify_extension(ext: &str) -> Option<(&'static str, MediaClass)> {
    let ext = ext.to_ascii_lowercase();
    let entry = match ext.as_str() {
        "mp4" | "m4v" | "mov" => ("video/mp4", MediaClass::Video),
        "mkv" => ("video/x-matroska", MediaClass::Video),
        "avi" => ("video/x-msvideo", MediaClass::Video),
        "webm" => ("video/webm", MediaClass::Video),
        "ts" | "m2ts" => ("video/mp2t", MediaClass::Video),
        "mp3" => ("audio/mpeg", MediaClass::Audio),
        "flac" => ("audio/flac", MediaClass::Audio),
        "wav" => ("audio/wav", MediaClass::Audio),
        "aac" | "m4a" => ("audio/mp4", MediaClass::Audio),
        "ogg" => ("audio/ogg", MediaClass::Audio),
        "jpg" | "jpeg" => ("image/jpeg", MediaClass::Image),
        "png" => ("image/png", MediaClass::Image),
        "gif" => ("image/gif", MediaClass::Image),
        _ => return None,
    };
    Some(entry)
}

/// Liste des types MIME supportés, pour `GetProtocolInfo`.
pub fn supported_mime_types() -> &'static [&'static str] {
    &[
        "video/mp4",
        "video/x-matroska",
        "video/x-msvideo",
        "video/webm",
        "video/mp2t",
        "audio/mpeg",
        "audio/flac",
        "audio/wav",
        "audio/mp4",
        "audio/ogg",
        "image/jpeg",
        "image/png",
        "image/gif",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_match() {
        assert_eq!(
            classify_extension("MP4"),
            Some(("video/mp4", MediaClass::Video))
        );
        assert_eq!(
            classify_extension("Jpeg"),
            Some(("image/jpeg", MediaClass::Image))
        );
    }

    #[test]
    fn test_unknown_extension_hidden() {
        assert_eq!(classify_extension("txt"), None);
        assert_eq!(classify_extension("exe"), None);
        assert_eq!(classify_extension(""), None);
    }

    #[test]
    fn test_audio_class() {
        let (mime, class) = classify_extension("flac").unwrap();
        assert_eq!(mime, "audio/flac");
        assert_eq!(class.upnp_class(), "object.item.audioItem.musicTrack");
    }

    #[test]
    fn test_every_table_mime_is_advertised() {
        for ext in [
            "mp4", "mkv", "avi", "webm", "ts", "mp3", "flac", "wav", "aac", "ogg", "jpg", "png",
            "gif",
        ] {
            let (mime, _) = classify_extension(ext).unwrap();
            assert!(supported_mime_types().contains(&mime), "{mime} missing");
        }
    }
}
