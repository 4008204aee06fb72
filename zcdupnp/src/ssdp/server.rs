//! Répondeur SSDP.

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use super::{SsdpDevice, MAX_AGE, SSDP_MULTICAST_ADDR, SSDP_PORT};

/// Nombre d'envois de la rafale de démarrage.
const STARTUP_BURST: u32 = 3;

/// Espacement des envois de la rafale (survit à la perte d'un paquet).
const STARTUP_BURST_SPACING: Duration = Duration::from_millis(200);

/// Délai maximal d'étalement des réponses M-SEARCH (secondes).
const MAX_REPLY_DELAY_SECS: u64 = 3;

/// Répondeur SSDP : annonces périodiques et réponses M-SEARCH.
///
/// Deux threads dédiés : l'annonceur (rafale de démarrage puis ré-annonce
/// toutes les max-age/2 secondes) et l'écouteur de datagrammes. L'arrêt
/// envoie les byebye puis laisse les threads s'éteindre sur leur timeout
/// de lecture.
pub struct SsdpServer {
    device: SsdpDevice,
    socket: Option<Arc<UdpSocket>>,
    running: Arc<AtomicBool>,
}

impl SsdpServer {
    pub fn new(device: SsdpDevice) -> Self {
        Self {
            device,
            socket: None,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Démarre le répondeur : socket multicast partagé puis threads.
    ///
    /// # Errors
    ///
    /// Échec du bind sur le port 1900 ou du join multicast ; fatal pour la
    /// découverte, remonté au superviseur.
    pub fn start(&mut self) -> std::io::Result<()> {
        let socket = create_ssdp_socket()?;
        let socket = Arc::new(socket);
        self.socket = Some(socket.clone());
        self.running.store(true, Ordering::Relaxed);

        info!("📡 SSDP responder listening on 0.0.0.0:{SSDP_PORT}");

        self.spawn_announcer(socket.clone());
        self.spawn_msearch_listener(socket);

        Ok(())
    }

    /// Arrête le répondeur et envoie les byebye.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::Relaxed) {
            return;
        }

        if let Some(socket) = self.socket.take() {
            info!("👋 Sending ssdp:byebye for all advertised tuples");
            for (nt, usn) in self.device.advertised_tuples() {
                send_byebye(&socket, nt, &usn);
            }
        }
    }

    /// Thread d'annonces : rafale de démarrage puis ré-annonces périodiques.
    fn spawn_announcer(&self, socket: Arc<UdpSocket>) {
        let device = self.device.clone();
        let running = self.running.clone();

        std::thread::spawn(move || {
            for round in 0..STARTUP_BURST {
                if !running.load(Ordering::Relaxed) {
                    return;
                }
                if round > 0 {
                    std::thread::sleep(STARTUP_BURST_SPACING);
                }
                for (nt, usn) in device.advertised_tuples() {
                    send_alive(&socket, &device, nt, &usn);
                }
            }
            info!("✅ SSDP alive burst sent ({STARTUP_BURST}x per tuple)");

            let period_secs = u64::from(MAX_AGE / 2);
            loop {
                // Sommeil découpé pour réagir à l'arrêt en ~1 s
                for _ in 0..period_secs {
                    if !running.load(Ordering::Relaxed) {
                        return;
                    }
                    std::thread::sleep(Duration::from_secs(1));
                }
                for (nt, usn) in device.advertised_tuples() {
                    send_alive(&socket, &device, nt, &usn);
                }
                debug!("periodic ssdp:alive re-announce sent");
            }
        });
    }

    /// Thread d'écoute des M-SEARCH.
    fn spawn_msearch_listener(&self, socket: Arc<UdpSocket>) {
        let device = self.device.clone();
        let running = self.running.clone();

        std::thread::spawn(move || {
            let mut buf = [0u8; 8192];
            while running.load(Ordering::Relaxed) {
                match socket.recv_from(&mut buf) {
                    Ok((n, src)) => {
                        let data = String::from_utf8_lossy(&buf[..n]);
                        if let Some(search) = parse_msearch(&data) {
                            handle_msearch(&device, search, src);
                        }
                    }
                    Err(e)
                        if e.kind() == std::io::ErrorKind::WouldBlock
                            || e.kind() == std::io::ErrorKind::TimedOut =>
                    {
                        continue;
                    }
                    Err(e) => {
                        if running.load(Ordering::Relaxed) {
                            debug!("SSDP receive error: {e}");
                        }
                    }
                }
            }
        });
    }
}

impl Drop for SsdpServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Requête M-SEARCH validée.
#[derive(Debug, PartialEq, Eq)]
struct MSearch {
    st: String,
    mx: u64,
}

/// Crée le socket UDP partagé : reuse-addr/port, membre du groupe multicast,
/// TTL 2, timeout de lecture court pour permettre l'arrêt.
fn create_ssdp_socket() -> std::io::Result<UdpSocket> {
    let socket = socket2::Socket::new(
        socket2::Domain::IPV4,
        socket2::Type::DGRAM,
        Some(socket2::Protocol::UDP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;

    let addr: SocketAddr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, SSDP_PORT));
    socket.bind(&addr.into())?;

    let socket: UdpSocket = socket.into();
    socket.join_multicast_v4(&SSDP_MULTICAST_ADDR, &Ipv4Addr::UNSPECIFIED)?;
    socket.set_multicast_ttl_v4(2)?;
    socket.set_multicast_loop_v4(false)?;
    socket.set_read_timeout(Some(Duration::from_secs(1)))?;

    Ok(socket)
}

/// Parse et valide un datagramme M-SEARCH.
///
/// Exige la request line `M-SEARCH * HTTP/1.1` et `MAN: "ssdp:discover"`.
/// MX est borné à [1, 5] ; absent ou non parsable vaut 1.
fn parse_msearch(data: &str) -> Option<MSearch> {
    let mut lines = data.lines();
    let request_line = lines.next()?.trim();
    if request_line != "M-SEARCH * HTTP/1.1" {
        return None;
    }

    let mut headers: HashMap<String, String> = HashMap::new();
    for line in lines {
        if let Some((key, value)) = line.split_once(':') {
            headers.insert(key.trim().to_uppercase(), value.trim().to_string());
        }
    }

    let man = headers.get("MAN")?.trim_matches('"');
    if man != "ssdp:discover" {
        return None;
    }

    let st = headers.get("ST")?.clone();
    let mx = headers
        .get("MX")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(1)
        .clamp(1, 5);

    Some(MSearch { st, mx })
}

/// Répond à un M-SEARCH : unicast, après un délai aléatoire dans
/// [0, min(MX, 3)] secondes pour étaler la tempête de réponses.
fn handle_msearch(device: &SsdpDevice, search: MSearch, src: SocketAddr) {
    let replies = device.reply_set(&search.st);
    if replies.is_empty() {
        return;
    }

    debug!(%src, st = %search.st, mx = search.mx, "M-SEARCH received");

    let location = device.location.clone();
    let server = device.server.clone();
    let max_delay = search.mx.min(MAX_REPLY_DELAY_SECS);

    std::thread::spawn(move || {
        let delay = rand::thread_rng().gen_range(0.0..=max_delay as f64);
        std::thread::sleep(Duration::from_secs_f64(delay));

        let Ok(reply_socket) = UdpSocket::bind("0.0.0.0:0") else {
            debug!("cannot open unicast reply socket");
            return;
        };

        let date = chrono::Utc::now().format("%a, %d %b %Y %H:%M:%S GMT");
        for (st, usn) in replies {
            let response = format!(
                "HTTP/1.1 200 OK\r\n\
                 CACHE-CONTROL: max-age={MAX_AGE}\r\n\
                 DATE: {date}\r\n\
                 EXT:\r\n\
                 LOCATION: {location}\r\n\
                 SERVER: {server}\r\n\
                 ST: {st}\r\n\
                 USN: {usn}\r\n\
                 \r\n"
            );

            match reply_socket.send_to(response.as_bytes(), src) {
                Ok(_) => debug!(%src, %st, "M-SEARCH response sent"),
                Err(e) => debug!(%src, "failed to send M-SEARCH response: {e}"),
            }
        }
    });
}

fn send_alive(socket: &UdpSocket, device: &SsdpDevice, nt: &str, usn: &str) {
    let msg = format!(
        "NOTIFY * HTTP/1.1\r\n\
         HOST: {SSDP_MULTICAST_ADDR}:{SSDP_PORT}\r\n\
         CACHE-CONTROL: max-age={MAX_AGE}\r\n\
         LOCATION: {}\r\n\
         NT: {nt}\r\n\
         NTS: ssdp:alive\r\n\
         SERVER: {}\r\n\
         USN: {usn}\r\n\
         \r\n",
        device.location, device.server
    );

    let addr = SocketAddrV4::new(SSDP_MULTICAST_ADDR, SSDP_PORT);
    if let Err(e) = socket.send_to(msg.as_bytes(), addr) {
        debug!("failed to send ssdp:alive for {usn}: {e}");
    }
}

fn send_byebye(socket: &UdpSocket, nt: &str, usn: &str) {
    let msg = format!(
        "NOTIFY * HTTP/1.1\r\n\
         HOST: {SSDP_MULTICAST_ADDR}:{SSDP_PORT}\r\n\
         NT: {nt}\r\n\
         NTS: ssdp:byebye\r\n\
         USN: {usn}\r\n\
         \r\n"
    );

    let addr = SocketAddrV4::new(SSDP_MULTICAST_ADDR, SSDP_PORT);
    if let Err(e) = socket.send_to(msg.as_bytes(), addr) {
        warn!("failed to send ssdp:byebye for {usn}: {e}");
    }
}
