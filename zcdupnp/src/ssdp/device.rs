//! Représentation du device pour les annonces SSDP.

use zcdconfig::DeviceIdentity;

use crate::{
    CONNECTION_MANAGER_SERVICE_TYPE, CONTENT_DIRECTORY_SERVICE_TYPE, MEDIA_SERVER_DEVICE_TYPE,
};

/// Device annoncé en SSDP, avec sa liste fixe de tuples (NT, USN).
#[derive(Debug, Clone)]
pub struct SsdpDevice {
    /// UDN complet, préfixe `uuid:` inclus
    pub udn: String,

    /// URL de la description du device
    pub location: String,

    /// Valeur du header SERVER
    pub server: String,

    /// Types de notification annoncés
    notification_types: Vec<String>,
}

impl SsdpDevice {
    /// Construit le device SSDP depuis l'identité partagée.
    pub fn from_identity(identity: &DeviceIdentity) -> Self {
        let udn = identity.udn.clone();
        let notification_types = vec![
            "upnp:rootdevice".to_string(),
            udn.clone(),
            MEDIA_SERVER_DEVICE_TYPE.to_string(),
            CONTENT_DIRECTORY_SERVICE_TYPE.to_string(),
            CONNECTION_MANAGER_SERVICE_TYPE.to_string(),
        ];

        Self {
            udn,
            location: identity.location(),
            server: identity.server_agent(),
            notification_types,
        }
    }

    /// Tuples (NT, USN) annoncés pour ce device.
    pub fn advertised_tuples(&self) -> impl Iterator<Item = (&str, String)> {
        self.notification_types
            .iter()
            .map(|nt| (nt.as_str(), self.usn_for(nt)))
    }

    /// USN associé à un type de notification.
    ///
    /// Le tuple UDN s'annonce seul ; les autres sont préfixés par l'UDN.
    pub fn usn_for(&self, nt: &str) -> String {
        if nt == self.udn {
            self.udn.clone()
        } else {
            format!("{}::{}", self.udn, nt)
        }
    }

    /// Tuples à renvoyer pour un search target M-SEARCH donné.
    ///
    /// `ssdp:all` reçoit une réponse par tuple annoncé ; un ST connu reçoit
    /// exactement le tuple correspondant ; tout le reste est ignoré.
    pub fn reply_set(&self, st: &str) -> Vec<(String, String)> {
        if st == "ssdp:all" {
            return self
                .advertised_tuples()
                .map(|(nt, usn)| (nt.to_string(), usn))
                .collect();
        }

        if self.notification_types.iter().any(|nt| nt == st) {
            return vec![(st.to_string(), self.usn_for(st))];
        }

        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_device() -> SsdpDevice {
        SsdpDevice {
            udn: "uuid:0000-1111".to_string(),
            location: "http://10.0.0.2:8200/description.xml".to_string(),
            server: "ZeroConfigDLNA/1.0.0 UPnP/1.0 DLNA/1.50".to_string(),
            notification_types: vec![
                "upnp:rootdevice".to_string(),
                "uuid:0000-1111".to_string(),
                MEDIA_SERVER_DEVICE_TYPE.to_string(),
                CONTENT_DIRECTORY_SERVICE_TYPE.to_string(),
                CONNECTION_MANAGER_SERVICE_TYPE.to_string(),
            ],
        }
    }

    #[test]
    fn test_usn_forms() {
        let device = test_device();
        assert_eq!(device.usn_for("uuid:0000-1111"), "uuid:0000-1111");
        assert_eq!(
            device.usn_for("upnp:rootdevice"),
            "uuid:0000-1111::upnp:rootdevice"
        );
    }

    #[test]
    fn test_ssdp_all_answers_every_tuple() {
        let device = test_device();
        assert_eq!(device.reply_set("ssdp:all").len(), 5);
    }

    #[test]
    fn test_specific_st_answers_once() {
        let device = test_device();
        let replies = device.reply_set(CONTENT_DIRECTORY_SERVICE_TYPE);
        assert_eq!(replies.len(), 1);
        assert_eq!(
            replies[0].1,
            "uuid:0000-1111::urn:schemas-upnp-org:service:ContentDirectory:1"
        );
    }

    #[test]
    fn test_exact_udn_match() {
        let device = test_device();
        let replies = device.reply_set("uuid:0000-1111");
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].1, "uuid:0000-1111");
    }

    #[test]
    fn test_unknown_st_ignored() {
        let device = test_device();
        assert!(device.reply_set("urn:dial-multiscreen-org:service:dial:1").is_empty());
        assert!(device.reply_set("uuid:other-device").is_empty());
    }
}
