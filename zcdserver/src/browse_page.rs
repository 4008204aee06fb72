//! Listing HTML de debug, accessible depuis un navigateur.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use std::fmt::Write;
use tracing::debug;

use zcddidl::resource_url;
use zcdindex::ObjectKind;

use crate::routes::AppState;

#[derive(Deserialize)]
pub struct BrowseQuery {
    #[serde(default)]
    pub id: u64,
}

/// GET /browse?id=N
///
/// Page purement utilitaire pour vérifier ce que les clients DLNA verront ;
/// les items pointent vers les mêmes URLs `/media/` que le DIDL.
pub async fn browse_page(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> Response {
    debug!(id = query.id, "browse page requested");

    let title = if query.id == 0 {
        state.identity.friendly_name.clone()
    } else {
        match state.index.metadata(query.id) {
            Ok(obj) => obj.title,
            Err(_) => return StatusCode::NOT_FOUND.into_response(),
        }
    };

    let (children, total) = match state.index.list(query.id, 0, usize::MAX) {
        Ok(listing) => listing,
        Err(_) => return StatusCode::NOT_FOUND.into_response(),
    };

    let media_count = children.iter().filter(|c| !c.is_container()).count();
    let base_url = state.identity.base_url();

    let mut page = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{name}</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px; }}
        .file-list {{ list-style-type: none; padding: 0; }}
        .file-item {{ margin: 10px 0; padding: 10px; border: 1px solid #ddd; border-radius: 5px; }}
        .dir-item {{ background-color: #f5f5f5; }}
        .file-name {{ font-weight: bold; }}
        .file-info {{ color: #666; font-size: 0.9em; }}
        a {{ text-decoration: none; color: #0066cc; }}
    </style>
</head>
<body>
    <h1>{name}</h1>
    <p><a href="/browse?id=0">Home</a> &mdash; {title}</p>
    <p>{count} media files, {total} entries in this directory</p>
    <ul class="file-list">"#,
        name = html_escape(&state.identity.friendly_name),
        title = html_escape(&title),
        count = media_count,
        total = total,
    );

    for child in &children {
        match &child.kind {
            ObjectKind::Container { child_count } => {
                write!(
                    page,
                    r#"
        <li class="file-item dir-item">
            <div class="file-name"><a href="/browse?id={id}">&#128193; {name}</a></div>
            <div class="file-info">{count} entries</div>
        </li>"#,
                    id = child.id,
                    name = html_escape(&child.title),
                    count = child_count,
                )
                .expect("writing to String cannot fail");
            }
            ObjectKind::Item {
                mime_type, size, ..
            } => {
                write!(
                    page,
                    r#"
        <li class="file-item">
            <div class="file-name"><a href="{url}" target="_blank">{name}</a></div>
            <div class="file-info">Type: {mime} | Size: {size} bytes</div>
        </li>"#,
                    url = resource_url(&base_url, child.id, &child.title),
                    name = html_escape(&child.title),
                    mime = mime_type,
                    size = size,
                )
                .expect("writing to String cannot fail");
            }
        }
    }

    page.push_str("\n    </ul>\n</body>\n</html>");
    Html(page).into_response()
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
