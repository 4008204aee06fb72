use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Devine l'adresse IPv4 locale primaire.
///
/// On connecte un socket UDP vers une adresse publique (aucun paquet n'est
/// émis) et on lit l'adresse source choisie par le noyau. C'est l'interface
/// qui route vers l'extérieur, donc aussi celle qui route vers le groupe
/// multicast SSDP dans une configuration mono-interface.
pub fn guess_local_ip() -> IpAddr {
    match UdpSocket::bind("0.0.0.0:0") {
        Ok(socket) => {
            if socket.connect("8.8.8.8:80").is_ok() {
                if let Ok(local_addr) = socket.local_addr() {
                    return local_addr.ip();
                }
            }
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
        Err(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
    }
}

/// Nom d'hôte court : tronqué au premier point, limité à 16 caractères.
pub fn short_hostname() -> String {
    let name = hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "localhost".to_string());

    let short = name.split('.').next().unwrap_or(&name);
    short.chars().take(16).collect()
}
