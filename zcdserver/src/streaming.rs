//! Streaming des fichiers média avec support des requêtes Range.

use std::io::SeekFrom;
use std::path::Path;

use axum::body::Body;
use axum::extract::{Path as UrlPath, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

use zcddidl::PROTOCOL_FEATURES;
use zcdindex::{classify_extension, IndexError, ObjectId};

use crate::routes::AppState;

/// Taille des fenêtres de lecture disque : la mémoire reste bornée quel que
/// soit le poids du fichier.
const STREAM_BUFFER_SIZE: usize = 64 * 1024;

/// GET/HEAD /media/{id}
pub async fn media_by_id(
    State(state): State<AppState>,
    method: Method,
    UrlPath(id): UrlPath<ObjectId>,
    headers: HeaderMap,
) -> Response {
    serve_media(state, method, id, headers).await
}

/// GET/HEAD /media/{id}/{titre} — le segment titre est purement indicatif.
pub async fn media_with_title(
    State(state): State<AppState>,
    method: Method,
    UrlPath((id, _title)): UrlPath<(ObjectId, String)>,
    headers: HeaderMap,
) -> Response {
    serve_media(state, method, id, headers).await
}

async fn serve_media(state: AppState, method: Method, id: ObjectId, headers: HeaderMap) -> Response {
    // Résolution sûre : liens symboliques suivis puis confinement vérifié
    let path = match state.index.resolve_safe(id) {
        Ok(path) => path,
        Err(IndexError::OutsideRoot(_)) => {
            warn!(id, "media request escapes the served directory");
            return StatusCode::NOT_FOUND.into_response();
        }
        Err(e) => {
            info!(id, "media request for unresolvable object: {e}");
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    let Ok(meta) = tokio::fs::metadata(&path).await else {
        warn!(id, path = %path.display(), "media file vanished");
        return StatusCode::NOT_FOUND.into_response();
    };
    if !meta.is_file() {
        return StatusCode::NOT_FOUND.into_response();
    }

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let Some((mime_type, _)) = classify_extension(ext) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let size = meta.len();
    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_range);

    debug!(id, size, ?range, %method, "media request for {}", path.display());

    match range {
        // Pas de Range (ou Range malformé, ignoré) : corps complet
        None => full_response(&state, &path, method, mime_type, size, &headers).await,
        Some(spec) => match resolve_range(spec, size) {
            Some((start, end)) => {
                partial_response(&state, &path, method, mime_type, size, start, end, &headers).await
            }
            None => {
                info!(id, size, "unsatisfiable range request");
                let mut response = (StatusCode::RANGE_NOT_SATISFIABLE, Body::empty()).into_response();
                insert_header(&mut response, header::CONTENT_RANGE, &format!("bytes */{size}"));
                response
            }
        },
    }
}

async fn full_response(
    state: &AppState,
    path: &Path,
    method: Method,
    mime_type: &str,
    size: u64,
    request_headers: &HeaderMap,
) -> Response {
    let body = if method == Method::HEAD {
        Body::empty()
    } else {
        match stream_file(path, 0, size).await {
            Ok(body) => body,
            Err(response) => return response,
        }
    };

    let mut response = (StatusCode::OK, body).into_response();
    media_headers(state, &mut response, mime_type, size, request_headers);
    response
}

#[allow(clippy::too_many_arguments)]
async fn partial_response(
    state: &AppState,
    path: &Path,
    method: Method,
    mime_type: &str,
    size: u64,
    start: u64,
    end: u64,
    request_headers: &HeaderMap,
) -> Response {
    let length = end - start + 1;
    let body = if method == Method::HEAD {
        Body::empty()
    } else {
        match stream_file(path, start, length).await {
            Ok(body) => body,
            Err(response) => return response,
        }
    };

    let mut response = (StatusCode::PARTIAL_CONTENT, body).into_response();
    media_headers(state, &mut response, mime_type, length, request_headers);
    insert_header(
        &mut response,
        header::CONTENT_RANGE,
        &format!("bytes {start}-{end}/{size}"),
    );
    response
}

/// Ouvre le fichier et borne la lecture à la fenêtre demandée.
///
/// L'échec d'ouverture arrive avant tout octet envoyé : 404 propre. Une
/// déconnexion client en cours de stream ferme simplement le flux.
async fn stream_file(path: &Path, start: u64, length: u64) -> Result<Body, Response> {
    let mut file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) => {
            warn!("cannot open media file {}: {e}", path.display());
            return Err(StatusCode::NOT_FOUND.into_response());
        }
    };

    if start > 0 {
        if let Err(e) = file.seek(SeekFrom::Start(start)).await {
            warn!("cannot seek media file {}: {e}", path.display());
            return Err(StatusCode::NOT_FOUND.into_response());
        }
    }

    let reader = file.take(length);
    let stream = ReaderStream::with_capacity(reader, STREAM_BUFFER_SIZE);
    Ok(Body::from_stream(stream))
}

/// Headers communs des réponses média, DLNA inclus.
fn media_headers(
    state: &AppState,
    response: &mut Response,
    mime_type: &str,
    content_length: u64,
    request_headers: &HeaderMap,
) {
    insert_header(response, header::CONTENT_TYPE, mime_type);
    insert_header(response, header::CONTENT_LENGTH, &content_length.to_string());
    insert_header(response, header::ACCEPT_RANGES, "bytes");
    insert_header(response, header::CACHE_CONTROL, "max-age=3600");
    insert_header(response, header::SERVER, &state.identity.server_agent());
    insert_header(
        response,
        header::HeaderName::from_static("contentfeatures.dlna.org"),
        PROTOCOL_FEATURES,
    );
    insert_header(
        response,
        header::HeaderName::from_static("transfermode.dlna.org"),
        transfer_mode(request_headers),
    );
}

/// Mode de transfert DLNA : la valeur du client si elle est valide,
/// `Streaming` sinon.
fn transfer_mode(request_headers: &HeaderMap) -> &'static str {
    match request_headers
        .get("transfermode.dlna.org")
        .and_then(|v| v.to_str().ok())
    {
        Some("Interactive") => "Interactive",
        Some("Background") => "Background",
        _ => "Streaming",
    }
}

fn insert_header(response: &mut Response, name: header::HeaderName, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        response.headers_mut().insert(name, value);
    }
}

/// Forme syntaxique d'un header Range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSpec {
    /// `bytes=a-b`
    FromTo(u64, u64),
    /// `bytes=a-`
    From(u64),
    /// `bytes=-s` (suffixe : les s derniers octets)
    Suffix(u64),
}

/// Parse un header `Range`. Un header malformé vaut `None` et la requête est
/// servie entière, conformément à HTTP.
pub fn parse_range(value: &str) -> Option<RangeSpec> {
    let spec = value.trim().strip_prefix("bytes=")?;
    let (start, end) = spec.split_once('-')?;
    let start = start.trim();
    let end = end.trim();

    match (start.is_empty(), end.is_empty()) {
        (true, false) => end.parse().ok().map(RangeSpec::Suffix),
        (false, true) => start.parse().ok().map(RangeSpec::From),
        (false, false) => {
            let a = start.parse().ok()?;
            let b = end.parse().ok()?;
            Some(RangeSpec::FromTo(a, b))
        }
        (true, true) => None,
    }
}

/// Résout une forme Range en fenêtre `[start, end]` inclusive.
///
/// # Returns
///
/// `None` si la plage est insatisfiable pour cette taille (réponse 416).
pub fn resolve_range(spec: RangeSpec, size: u64) -> Option<(u64, u64)> {
    if size == 0 {
        return None;
    }

    match spec {
        RangeSpec::FromTo(start, end) => {
            if start >= size || start > end {
                return None;
            }
            Some((start, end.min(size - 1)))
        }
        RangeSpec::From(start) => {
            if start >= size {
                return None;
            }
            Some((start, size - 1))
        }
        RangeSpec::Suffix(len) => {
            if len == 0 {
                return None;
            }
            Some((size - len.min(size), size - 1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_forms() {
        assert_eq!(parse_range("bytes=100-199"), Some(RangeSpec::FromTo(100, 199)));
        assert_eq!(parse_range("bytes=100-"), Some(RangeSpec::From(100)));
        assert_eq!(parse_range("bytes=-500"), Some(RangeSpec::Suffix(500)));
    }

    #[test]
    fn test_parse_range_malformed() {
        assert_eq!(parse_range("bytes=-"), None);
        assert_eq!(parse_range("bytes=abc-def"), None);
        assert_eq!(parse_range("items=0-10"), None);
        assert_eq!(parse_range(""), None);
    }

    #[test]
    fn test_resolve_bounded_range() {
        assert_eq!(resolve_range(RangeSpec::FromTo(100, 199), 1000), Some((100, 199)));
        // La fin est bornée à la taille du fichier
        assert_eq!(resolve_range(RangeSpec::FromTo(900, 5000), 1000), Some((900, 999)));
    }

    #[test]
    fn test_resolve_open_and_suffix() {
        assert_eq!(resolve_range(RangeSpec::From(990), 1000), Some((990, 999)));
        assert_eq!(resolve_range(RangeSpec::Suffix(10), 1000), Some((990, 999)));
        // Suffixe plus grand que le fichier : tout le fichier
        assert_eq!(resolve_range(RangeSpec::Suffix(5000), 1000), Some((0, 999)));
    }

    #[test]
    fn test_resolve_unsatisfiable() {
        assert_eq!(resolve_range(RangeSpec::FromTo(5000, 6000), 1000), None);
        assert_eq!(resolve_range(RangeSpec::From(1000), 1000), None);
        assert_eq!(resolve_range(RangeSpec::FromTo(200, 100), 1000), None);
        assert_eq!(resolve_range(RangeSpec::Suffix(0), 1000), None);
        assert_eq!(resolve_range(RangeSpec::FromTo(0, 0), 0), None);
    }
}
