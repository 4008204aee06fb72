//! Cycle de vie du MediaServer : construction, démarrage, arrêt gracieux.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use zcdconfig::{DeviceIdentity, ServerConfig};
use zcdindex::{classify_extension, ContentIndex};
use zcdupnp::ssdp::{SsdpDevice, SsdpServer};

use crate::errors::ServerError;
use crate::routes::{build_router, AppState};

/// Délai accordé aux streams en cours après le signal d'arrêt.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Serveur DLNA complet : HTTP + SSDP autour d'un index partagé.
pub struct MediaServer {
    identity: Arc<DeviceIdentity>,
    index: Arc<ContentIndex>,
    ssdp: SsdpServer,
    shutdown: CancellationToken,
    join_handle: Option<JoinHandle<()>>,
}

impl MediaServer {
    /// Construit le serveur depuis une configuration validée.
    pub fn new(config: &ServerConfig) -> Result<Self, ServerError> {
        let index = Arc::new(ContentIndex::new(&config.directory)?);
        let identity = Arc::new(DeviceIdentity::from_config(config));

        let media_count = count_media_files(index.root());
        info!(
            "🎬 Serving {} ({media_count} media files) as \"{}\"",
            index.root().display(),
            identity.friendly_name
        );

        let ssdp = SsdpServer::new(SsdpDevice::from_identity(&identity));

        Ok(Self {
            identity,
            index,
            ssdp,
            shutdown: CancellationToken::new(),
            join_handle: None,
        })
    }

    /// Démarre l'acceptor HTTP puis le répondeur SSDP.
    ///
    /// # Errors
    ///
    /// [`ServerError::PortInUse`] si le port HTTP est occupé (code de sortie
    /// 3), [`ServerError::Multicast`] si le join SSDP échoue.
    pub async fn start(&mut self) -> Result<(), ServerError> {
        let addr = SocketAddr::from((self.identity.bind_ip, self.identity.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                ServerError::PortInUse(self.identity.port)
            } else {
                ServerError::Io(e)
            }
        })?;

        info!("✅ DLNA server running at {}", self.identity.base_url());
        info!("   Device description: {}", self.identity.location());
        info!("   Browse media: {}browse", self.identity.base_url());

        let router = build_router(AppState::new(self.identity.clone(), self.index.clone()));
        let token = self.shutdown.clone();
        self.join_handle = Some(tokio::spawn(async move {
            let serve = axum::serve(listener, router)
                .with_graceful_shutdown(async move { token.cancelled().await });
            if let Err(e) = serve.await {
                error!("HTTP server terminated abnormally: {e}");
            }
        }));

        self.ssdp.start().map_err(ServerError::Multicast)?;

        Ok(())
    }

    /// Arrêt gracieux : plus de nouvelles connexions, streams en cours
    /// tolérés pendant [`SHUTDOWN_GRACE`], puis byebye SSDP.
    pub async fn stop(&mut self) {
        info!("Shutting down...");
        self.shutdown.cancel();

        if let Some(join) = self.join_handle.take() {
            let abort = join.abort_handle();
            if tokio::time::timeout(SHUTDOWN_GRACE, join).await.is_err() {
                warn!("in-flight connections exceeded the grace period, closing");
                abort.abort();
            }
        }

        self.ssdp.stop();
        info!("Server stopped");
    }
}

/// Compte récursivement les fichiers média servables sous un répertoire.
fn count_media_files(dir: &Path) -> u64 {
    let Ok(entries) = std::fs::read_dir(dir) else { return 0 };

    let mut count = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name.starts_with('.') {
            continue;
        }

        let Ok(meta) = std::fs::metadata(&path) else { continue };
        if meta.is_dir() {
            count += count_media_files(&path);
        } else if meta.is_file() {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if classify_extension(ext).is_some() {
                count += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_count_media_files_recursive() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a.mp4")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();
        std::fs::create_dir(dir.path().join("music")).unwrap();
        File::create(dir.path().join("music/b.mp3")).unwrap();
        File::create(dir.path().join(".hidden.mp3")).unwrap();

        assert_eq!(count_media_files(dir.path()), 2);
    }
}
