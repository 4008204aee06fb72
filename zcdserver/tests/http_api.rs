//! Tests d'intégration de la surface HTTP, routeur piloté en direct.

use std::fs::File;
use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use zcdconfig::{DeviceIdentity, ServerConfig};
use zcdindex::ContentIndex;
use zcdserver::{build_router, AppState};

const CD_SOAPACTION: &str = "\"urn:schemas-upnp-org:service:ContentDirectory:1#Browse\"";

fn make_app(dir: &Path) -> (Router, Arc<ContentIndex>) {
    let config = ServerConfig {
        directory: dir.to_path_buf(),
        bind_ip: Some("127.0.0.1".parse().unwrap()),
        ..Default::default()
    };
    let identity = Arc::new(DeviceIdentity::from_config(&config));
    let index = Arc::new(ContentIndex::new(dir).unwrap());
    (build_router(AppState::new(identity, index.clone())), index)
}

fn browse_body(object_id: &str, flag: &str, start: u32, count: u32) -> String {
    format!(
        r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"
            s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
  <s:Body>
    <u:Browse xmlns:u="urn:schemas-upnp-org:service:ContentDirectory:1">
      <ObjectID>{object_id}</ObjectID>
      <BrowseFlag>{flag}</BrowseFlag>
      <Filter>*</Filter>
      <StartingIndex>{start}</StartingIndex>
      <RequestedCount>{count}</RequestedCount>
      <SortCriteria></SortCriteria>
    </u:Browse>
  </s:Body>
</s:Envelope>"#
    )
}

fn soap_request(path: &str, soapaction: &str, body: String) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(path)
        .header("SOAPACTION", soapaction)
        .header(header::CONTENT_TYPE, "text/xml; charset=\"utf-8\"")
        .body(Body::from(body))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[tokio::test]
async fn test_description_xml() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = make_app(dir.path());

    let response = app
        .oneshot(Request::get("/description.xml").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .contains("text/xml"));

    let body = body_string(response).await;
    assert!(body.contains("urn:schemas-upnp-org:device:MediaServer:1"));
    assert!(body.contains("DMS-1.50"));
    assert!(body.contains("uuid:"));
}

#[tokio::test]
async fn test_scpd_documents() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = make_app(dir.path());

    for path in ["/ContentDirectory.xml", "/ConnectionManager.xml"] {
        let response = app
            .clone()
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{path}");
        let body = body_string(response).await;
        assert!(body.contains("<scpd"), "{path}");
    }
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = make_app(dir.path());

    let response = app
        .oneshot(Request::get("/somewhere/else").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_root_browse_lists_media_only() {
    let dir = tempfile::tempdir().unwrap();
    let mut movie = File::create(dir.path().join("a.mp4")).unwrap();
    movie.write_all(b"0123456789").unwrap();
    File::create(dir.path().join("b.txt")).unwrap();
    std::fs::create_dir(dir.path().join("photos")).unwrap();
    File::create(dir.path().join("photos/x.jpg")).unwrap();

    let (app, _) = make_app(dir.path());
    let response = app
        .oneshot(soap_request(
            "/ContentDirectory/control",
            CD_SOAPACTION,
            browse_body("0", "BrowseDirectChildren", 0, 0),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;

    assert!(body.contains("<NumberReturned>2</NumberReturned>"));
    assert!(body.contains("<TotalMatches>2</TotalMatches>"));
    assert!(body.contains("photos"));
    assert!(body.contains("a.mp4"));
    assert!(!body.contains("b.txt"));
    assert!(body.contains("DLNA.ORG_OP=01"));
    assert!(body.contains("video/mp4"));

    // Container avant item dans le DIDL
    let photos_pos = body.find("photos").unwrap();
    let movie_pos = body.find("a.mp4").unwrap();
    assert!(photos_pos < movie_pos);
}

#[tokio::test]
async fn test_browse_metadata_of_root() {
    let dir = tempfile::tempdir().unwrap();
    File::create(dir.path().join("a.mp4")).unwrap();

    let (app, _) = make_app(dir.path());
    let response = app
        .oneshot(soap_request(
            "/ContentDirectory/control",
            CD_SOAPACTION,
            browse_body("0", "BrowseMetadata", 0, 0),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;

    assert!(body.contains("<NumberReturned>1</NumberReturned>"));
    // Le DIDL est échappé dans Result ; les guillemets peuvent rester bruts
    assert!(body.contains(r#"parentID="-1""#) || body.contains("parentID=&quot;-1&quot;"));
    assert_eq!(body.matches("&lt;container").count(), 1);
}

#[tokio::test]
async fn test_paged_browse() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..250 {
        File::create(dir.path().join(format!("track{i:03}.mp3"))).unwrap();
    }

    let (app, _) = make_app(dir.path());
    let response = app
        .oneshot(soap_request(
            "/ContentDirectory/control",
            CD_SOAPACTION,
            browse_body("0", "BrowseDirectChildren", 100, 50),
        ))
        .await
        .unwrap();

    let body = body_string(response).await;
    assert!(body.contains("<NumberReturned>50</NumberReturned>"));
    assert!(body.contains("<TotalMatches>250</TotalMatches>"));
    assert!(body.contains("track100.mp3"));
    assert!(body.contains("track149.mp3"));
    assert!(!body.contains("track099.mp3"));
    assert!(!body.contains("track150.mp3"));
}

#[tokio::test]
async fn test_browse_unknown_object_is_701() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = make_app(dir.path());

    let response = app
        .oneshot(soap_request(
            "/ContentDirectory/control",
            CD_SOAPACTION,
            browse_body("424242", "BrowseDirectChildren", 0, 0),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(response).await;
    assert!(body.contains("<errorCode>701</errorCode>"));
}

#[tokio::test]
async fn test_browse_invalid_args_is_402() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = make_app(dir.path());

    let response = app
        .oneshot(soap_request(
            "/ContentDirectory/control",
            CD_SOAPACTION,
            browse_body("not-a-number", "BrowseDirectChildren", 0, 0),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(response).await;
    assert!(body.contains("<errorCode>402</errorCode>"));
}

#[tokio::test]
async fn test_unknown_soap_action_is_401() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = make_app(dir.path());

    let response = app
        .oneshot(soap_request(
            "/ContentDirectory/control",
            "\"urn:schemas-upnp-org:service:ContentDirectory:1#DestroyObject\"",
            browse_body("0", "BrowseDirectChildren", 0, 0),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(response).await;
    assert!(body.contains("<errorCode>401</errorCode>"));
}

#[tokio::test]
async fn test_get_system_update_id() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = make_app(dir.path());

    let response = app
        .oneshot(soap_request(
            "/ContentDirectory/control",
            "\"urn:schemas-upnp-org:service:ContentDirectory:1#GetSystemUpdateID\"",
            browse_body("0", "BrowseDirectChildren", 0, 0),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("GetSystemUpdateIDResponse"));
    assert!(body.contains("<Id>"));
}

#[tokio::test]
async fn test_sort_and_search_capabilities() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = make_app(dir.path());

    let response = app
        .clone()
        .oneshot(soap_request(
            "/ContentDirectory/control",
            "\"urn:schemas-upnp-org:service:ContentDirectory:1#GetSortCapabilities\"",
            browse_body("0", "BrowseDirectChildren", 0, 0),
        ))
        .await
        .unwrap();
    let body = body_string(response).await;
    assert!(body.contains("<SortCaps>dc:title</SortCaps>"));

    let response = app
        .oneshot(soap_request(
            "/ContentDirectory/control",
            "\"urn:schemas-upnp-org:service:ContentDirectory:1#GetSearchCapabilities\"",
            browse_body("0", "BrowseDirectChildren", 0, 0),
        ))
        .await
        .unwrap();
    let body = body_string(response).await;
    assert!(body.contains("GetSearchCapabilitiesResponse"));
    // Capacités de recherche vides : aucune valeur dans l'élément
    assert!(!body.contains("<SearchCaps>dc:"));
}

#[tokio::test]
async fn test_connection_manager_actions() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = make_app(dir.path());

    let response = app
        .clone()
        .oneshot(soap_request(
            "/ConnectionManager/control",
            "\"urn:schemas-upnp-org:service:ConnectionManager:1#GetProtocolInfo\"",
            browse_body("0", "BrowseDirectChildren", 0, 0),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("http-get:*:video/mp4:*"));
    assert!(body.contains("http-get:*:audio/flac:*"));

    let response = app
        .oneshot(soap_request(
            "/ConnectionManager/control",
            "\"urn:schemas-upnp-org:service:ConnectionManager:1#GetCurrentConnectionIDs\"",
            browse_body("0", "BrowseDirectChildren", 0, 0),
        ))
        .await
        .unwrap();
    let body = body_string(response).await;
    assert!(body.contains("<ConnectionIDs>0</ConnectionIDs>"));
}

/// Fichier de 1000 octets au contenu connu, indexé via un browse préalable.
async fn media_fixture() -> (tempfile::TempDir, Router, u64, Vec<u8>) {
    let dir = tempfile::tempdir().unwrap();
    let payload: Vec<u8> = (0..1000u32).map(|i| (i % 256) as u8).collect();
    let mut file = File::create(dir.path().join("movie.mp4")).unwrap();
    file.write_all(&payload).unwrap();

    let (app, index) = make_app(dir.path());
    let (children, _) = index.list(0, 0, usize::MAX).unwrap();
    let id = children[0].id;
    (dir, app, id, payload)
}

#[tokio::test]
async fn test_full_media_get() {
    let (_dir, app, id, payload) = media_fixture().await;

    let response = app
        .oneshot(
            Request::get(format!("/media/{id}/movie.mp4"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCEPT_RANGES], "bytes");
    assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(
        response.headers()["transfermode.dlna.org"],
        "Streaming"
    );
    assert!(response.headers()["contentfeatures.dlna.org"]
        .to_str()
        .unwrap()
        .contains("DLNA.ORG_OP=01"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), payload.as_slice());
}

#[tokio::test]
async fn test_range_roundtrip() {
    let (_dir, app, id, payload) = media_fixture().await;

    let response = app
        .oneshot(
            Request::get(format!("/media/{id}"))
                .header(header::RANGE, "bytes=100-199")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.headers()[header::CONTENT_RANGE],
        "bytes 100-199/1000"
    );
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "100");

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), &payload[100..200]);
}

#[tokio::test]
async fn test_suffix_range() {
    let (_dir, app, id, payload) = media_fixture().await;

    let response = app
        .oneshot(
            Request::get(format!("/media/{id}"))
                .header(header::RANGE, "bytes=-100")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.headers()[header::CONTENT_RANGE],
        "bytes 900-999/1000"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), &payload[900..]);
}

#[tokio::test]
async fn test_unsatisfiable_range() {
    let (_dir, app, id, _payload) = media_fixture().await;

    let response = app
        .oneshot(
            Request::get(format!("/media/{id}"))
                .header(header::RANGE, "bytes=5000-6000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes */1000");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_head_media() {
    let (_dir, app, id, _payload) = media_fixture().await;

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::HEAD)
                .uri(format!("/media/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "1000");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_removed_file_is_404() {
    let (dir, app, id, _payload) = media_fixture().await;
    std::fs::remove_file(dir.path().join("movie.mp4")).unwrap();

    let response = app
        .oneshot(
            Request::get(format!("/media/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_escape_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let outside = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(outside.path(), b"secret").unwrap();
    std::os::unix::fs::symlink(outside.path(), dir.path().join("evil.mp4")).unwrap();

    let (app, index) = make_app(dir.path());
    let (children, _) = index.list(0, 0, usize::MAX).unwrap();
    let evil_id = children[0].id;

    let response = app
        .oneshot(
            Request::get(format!("/media/{evil_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_events_subscribe_stub() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = make_app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::from_bytes(b"SUBSCRIBE").unwrap())
                .uri("/events")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["SID"].to_str().unwrap().starts_with("uuid:"));
    assert_eq!(response.headers()["TIMEOUT"], "Second-1800");
}

#[tokio::test]
async fn test_browse_page_lists_files() {
    let dir = tempfile::tempdir().unwrap();
    File::create(dir.path().join("a.mp4")).unwrap();
    File::create(dir.path().join("notes.txt")).unwrap();

    let (app, _) = make_app(dir.path());
    let response = app
        .oneshot(Request::get("/browse").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("a.mp4"));
    assert!(!body.contains("notes.txt"));
    assert!(body.contains("/media/"));
}
