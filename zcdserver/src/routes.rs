//! Construction du router Axum et handlers des ressources statiques.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, post};
use axum::Router;
use tracing::{debug, info};
use uuid::Uuid;

use zcdconfig::DeviceIdentity;
use zcdindex::ContentIndex;
use zcdupnp::description::{
    device_description, CONNECTION_MANAGER_SCPD, CONTENT_DIRECTORY_SCPD,
};

use crate::browse_page::browse_page;
use crate::control::{connection_manager_control, content_directory_control};
use crate::streaming::{media_by_id, media_with_title};

/// État partagé : l'identité immuable et l'index de contenu.
///
/// Passé par valeur aux handlers ; les deux membres sont des `Arc`, la copie
/// est donc bon marché.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<DeviceIdentity>,
    pub index: Arc<ContentIndex>,
}

impl AppState {
    pub fn new(identity: Arc<DeviceIdentity>, index: Arc<ContentIndex>) -> Self {
        Self { identity, index }
    }
}

/// Assemble le router complet du MediaServer.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/description.xml", get(serve_description))
        .route("/ContentDirectory.xml", get(serve_cd_scpd))
        .route("/ConnectionManager.xml", get(serve_cm_scpd))
        .route("/ContentDirectory/control", post(content_directory_control))
        .route("/ConnectionManager/control", post(connection_manager_control))
        .route("/media/{id}", get(media_by_id))
        .route("/media/{id}/{title}", get(media_with_title))
        .route("/browse", get(browse_page))
        .route("/events", any(handle_events))
        .fallback(not_found)
        .with_state(state)
}

/// Réponse XML avec les headers communs UPnP.
pub(crate) fn xml_response(status: StatusCode, identity: &DeviceIdentity, body: String) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, "text/xml; charset=\"utf-8\"".to_string()),
            (header::SERVER, identity.server_agent()),
        ],
        body,
    )
        .into_response()
}

async fn serve_description(State(state): State<AppState>) -> Response {
    debug!("serving device description");
    xml_response(
        StatusCode::OK,
        &state.identity,
        device_description(&state.identity),
    )
}

async fn serve_cd_scpd(State(state): State<AppState>) -> Response {
    xml_response(
        StatusCode::OK,
        &state.identity,
        CONTENT_DIRECTORY_SCPD.to_string(),
    )
}

async fn serve_cm_scpd(State(state): State<AppState>) -> Response {
    xml_response(
        StatusCode::OK,
        &state.identity,
        CONNECTION_MANAGER_SCPD.to_string(),
    )
}

/// Stubs d'abonnement événementiel UPnP.
///
/// Aucun événement n'est jamais émis, mais certains clients refusent un
/// device dont l'eventSubURL ne répond pas : on accorde un SID jetable.
async fn handle_events(method: Method) -> Response {
    match method.as_str() {
        "SUBSCRIBE" => {
            let sid = format!("uuid:{}", Uuid::new_v4());
            info!(%sid, "event subscription granted");
            Response::builder()
                .status(StatusCode::OK)
                .header("SID", sid)
                .header("TIMEOUT", "Second-1800")
                .header(header::CONTENT_LENGTH, "0")
                .body(Body::empty())
                .expect("static event response")
        }
        "UNSUBSCRIBE" => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_LENGTH, "0")
            .body(Body::empty())
            .expect("static event response"),
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
