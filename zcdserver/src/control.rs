//! Dispatch des requêtes de contrôle SOAP.
//!
//! Le header `SOAPACTION` sélectionne l'action ; le corps n'est parsé que
//! pour en extraire les arguments. Les erreurs protocole restent confinées
//! ici et repartent vers le client avec le code UPnP exact.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{debug, info, warn};

use zcddidl::{didl_container, didl_item, DIDLLite};
use zcdindex::{supported_mime_types, IndexError, ObjectId};
use zcdupnp::soap::{
    build_soap_fault, build_soap_response, error_codes, parse_soap_action,
    parse_soapaction_header, SoapAction,
};
use zcdupnp::{CONNECTION_MANAGER_SERVICE_TYPE, CONTENT_DIRECTORY_SERVICE_TYPE};

use crate::routes::AppState;

/// POST /ContentDirectory/control
pub async fn content_directory_control(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    match action_name(&headers, &body) {
        Some(name) => match name.as_str() {
            "Browse" => browse(&state, &body),
            "GetSortCapabilities" => soap_ok(
                &state,
                CONTENT_DIRECTORY_SERVICE_TYPE,
                "GetSortCapabilities",
                &[("SortCaps", "dc:title".to_string())],
            ),
            "GetSearchCapabilities" => soap_ok(
                &state,
                CONTENT_DIRECTORY_SERVICE_TYPE,
                "GetSearchCapabilities",
                &[("SearchCaps", String::new())],
            ),
            "GetSystemUpdateID" => soap_ok(
                &state,
                CONTENT_DIRECTORY_SERVICE_TYPE,
                "GetSystemUpdateID",
                &[("Id", state.index.update_id().to_string())],
            ),
            other => {
                info!(action = other, "unsupported ContentDirectory action");
                fault(error_codes::INVALID_ACTION, "Invalid Action")
            }
        },
        None => fault(error_codes::INVALID_ACTION, "Invalid Action"),
    }
}

/// POST /ConnectionManager/control
pub async fn connection_manager_control(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    match action_name(&headers, &body) {
        Some(name) => match name.as_str() {
            "GetProtocolInfo" => {
                let source: Vec<String> = supported_mime_types()
                    .iter()
                    .map(|mime| format!("http-get:*:{mime}:*"))
                    .collect();
                soap_ok(
                    &state,
                    CONNECTION_MANAGER_SERVICE_TYPE,
                    "GetProtocolInfo",
                    &[("Source", source.join(",")), ("Sink", String::new())],
                )
            }
            "GetCurrentConnectionIDs" => soap_ok(
                &state,
                CONNECTION_MANAGER_SERVICE_TYPE,
                "GetCurrentConnectionIDs",
                &[("ConnectionIDs", "0".to_string())],
            ),
            "GetCurrentConnectionInfo" => soap_ok(
                &state,
                CONNECTION_MANAGER_SERVICE_TYPE,
                "GetCurrentConnectionInfo",
                &[
                    ("RcsID", "-1".to_string()),
                    ("AVTransportID", "-1".to_string()),
                    ("ProtocolInfo", String::new()),
                    ("PeerConnectionManager", String::new()),
                    ("PeerConnectionID", "-1".to_string()),
                    ("Direction", "Output".to_string()),
                    ("Status", "OK".to_string()),
                ],
            ),
            other => {
                info!(action = other, "unsupported ConnectionManager action");
                fault(error_codes::INVALID_ACTION, "Invalid Action")
            }
        },
        None => fault(error_codes::INVALID_ACTION, "Invalid Action"),
    }
}

/// Nom de l'action : header SOAPACTION d'abord, corps SOAP en secours.
fn action_name(headers: &HeaderMap, body: &str) -> Option<String> {
    if let Some(value) = headers.get("soapaction").and_then(|v| v.to_str().ok()) {
        if let Some((_, action)) = parse_soapaction_header(value) {
            return Some(action.to_string());
        }
    }
    parse_soap_action(body.as_bytes()).ok().map(|a| a.name)
}

/// Fenêtre de browse validée depuis les arguments SOAP.
struct BrowseRequest {
    object_id: ObjectId,
    direct_children: bool,
    offset: usize,
    limit: usize,
}

impl BrowseRequest {
    /// Valide les arguments ; toute entrée non parsable vaut erreur 402.
    fn from_action(action: &SoapAction) -> Result<Self, ()> {
        let object_id = action.arg("ObjectID").ok_or(())?.trim().parse().map_err(|_| ())?;

        let direct_children = match action.arg("BrowseFlag").ok_or(())? {
            "BrowseDirectChildren" => true,
            "BrowseMetadata" => false,
            _ => return Err(()),
        };

        let offset = parse_count(action.arg("StartingIndex"))? as usize;

        // RequestedCount = 0 signifie « tout »
        let requested = parse_count(action.arg("RequestedCount"))?;
        let limit = if requested == 0 {
            usize::MAX
        } else {
            requested as usize
        };

        Ok(Self {
            object_id,
            direct_children,
            offset,
            limit,
        })
    }
}

/// Argument numérique optionnel : absent vaut 0, non parsable vaut erreur.
fn parse_count(arg: Option<&str>) -> Result<u32, ()> {
    match arg {
        None => Ok(0),
        Some(raw) => raw.trim().parse().map_err(|_| ()),
    }
}

/// Action Browse : consulte l'index et rend l'enveloppe BrowseResponse.
fn browse(state: &AppState, body: &str) -> Response {
    let Ok(action) = parse_soap_action(body.as_bytes()) else {
        info!("unparseable SOAP body for Browse");
        return fault(error_codes::INVALID_ARGS, "Invalid Args");
    };

    let Ok(request) = BrowseRequest::from_action(&action) else {
        info!("invalid Browse arguments");
        return fault(error_codes::INVALID_ARGS, "Invalid Args");
    };

    debug!(
        object_id = request.object_id,
        direct_children = request.direct_children,
        offset = request.offset,
        "ContentDirectory::Browse"
    );

    let result = if request.direct_children {
        state
            .index
            .list(request.object_id, request.offset, request.limit)
    } else {
        state
            .index
            .metadata(request.object_id)
            .map(|obj| (vec![obj], 1))
    };

    let (objects, total) = match result {
        Ok(ok) => ok,
        Err(IndexError::NotFound(id)) | Err(IndexError::OutsideRoot(id)) => {
            info!(object_id = id, "Browse on unknown object");
            return fault(error_codes::NO_SUCH_OBJECT, "No such object");
        }
        Err(IndexError::NotContainer(id)) => {
            info!(object_id = id, "BrowseDirectChildren on an item");
            return fault(error_codes::NO_SUCH_OBJECT, "No such object");
        }
        Err(IndexError::Io(e)) => {
            warn!("Browse failed on directory read: {e}");
            return fault(error_codes::ACTION_FAILED, "Action Failed");
        }
    };

    let base_url = state.identity.base_url();
    let mut didl = DIDLLite::new();
    for obj in &objects {
        if obj.is_container() {
            didl.containers.push(didl_container(obj));
        } else if let Some(item) = didl_item(obj, &base_url) {
            didl.items.push(item);
        }
    }

    let returned = didl.len();
    let didl_xml = match didl.to_xml() {
        Ok(xml) => xml,
        Err(e) => {
            warn!("DIDL-Lite serialization failed: {e}");
            return fault(error_codes::ACTION_FAILED, "Action Failed");
        }
    };

    // Lu après list() : une relecture qui a découvert du contenu l'a incrémenté
    let update_id = state.index.update_id();
    debug!(returned, total, update_id, "Browse completed");

    soap_ok(
        state,
        CONTENT_DIRECTORY_SERVICE_TYPE,
        "Browse",
        &[
            ("Result", didl_xml),
            ("NumberReturned", returned.to_string()),
            ("TotalMatches", total.to_string()),
            ("UpdateID", update_id.to_string()),
        ],
    )
}

/// Réponse SOAP 200 avec les headers UPnP communs.
fn soap_ok(
    state: &AppState,
    service_urn: &str,
    action: &str,
    values: &[(&str, String)],
) -> Response {
    match build_soap_response(service_urn, action, values) {
        Ok(xml) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/xml; charset=\"utf-8\"".to_string()),
                (header::SERVER, state.identity.server_agent()),
                (header::CACHE_CONTROL, "max-age=10, must-revalidate".to_string()),
                (header::HeaderName::from_static("ext"), String::new()),
            ],
            xml,
        )
            .into_response(),
        Err(e) => {
            warn!("SOAP response serialization failed: {e}");
            fault(error_codes::ACTION_FAILED, "Action Failed")
        }
    }
}

/// Fault SOAP : statut HTTP 500, code UPnP dans le détail.
fn fault(code: u16, description: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/xml; charset=\"utf-8\"")],
        build_soap_fault(code, description),
    )
        .into_response()
}
