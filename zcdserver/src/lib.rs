//! # zcdserver - Serveur HTTP DLNA
//!
//! Ce crate assemble les quatre familles de ressources HTTP du MediaServer
//! et porte le cycle de vie start/stop exposé au CLI.
//!
//! ## Routes
//!
//! - 📄 `GET /description.xml` : description du device racine
//! - 📄 `GET /ContentDirectory.xml`, `GET /ConnectionManager.xml` : SCPD
//! - 🎛 `POST /ContentDirectory/control`, `POST /ConnectionManager/control` : SOAP
//! - 🎬 `GET`/`HEAD` `/media/{id}[/{titre}]` : streaming avec support Range
//! - 🔎 `GET /browse` : listing HTML de debug
//! - 📬 `SUBSCRIBE`/`UNSUBSCRIBE /events` : stubs d'événementiel UPnP

mod browse_page;
mod control;
mod errors;
mod routes;
mod server;
mod streaming;

pub use errors::ServerError;
pub use routes::{build_router, AppState};
pub use server::MediaServer;
