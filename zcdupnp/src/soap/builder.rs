//! Construction des réponses SOAP.

use xmltree::{Element, EmitterConfig, XMLNode};

/// Construit une réponse SOAP `<u:ActionResponse>`.
///
/// # Arguments
///
/// * `service_urn` - URN du service (ex: "urn:schemas-upnp-org:service:ContentDirectory:1")
/// * `action` - Nom de l'action (ex: "Browse")
/// * `values` - Paires nom/valeur de sortie, dans l'ordre déclaré par le SCPD
///
/// Les valeurs sont insérées comme nœuds texte : l'échappement XML (dont le
/// document DIDL-Lite du `Result`) est fait à la sérialisation.
pub fn build_soap_response(
    service_urn: &str,
    action: &str,
    values: &[(&str, String)],
) -> Result<String, xmltree::Error> {
    let mut response_elem = Element::new(&format!("u:{action}Response"));
    response_elem
        .attributes
        .insert("xmlns:u".to_string(), service_urn.to_string());

    for (key, value) in values {
        let mut child = Element::new(key);
        child.children.push(XMLNode::Text(value.clone()));
        response_elem.children.push(XMLNode::Element(child));
    }

    let mut body = Element::new("s:Body");
    body.children.push(XMLNode::Element(response_elem));

    let mut envelope = Element::new("s:Envelope");
    envelope.attributes.insert(
        "xmlns:s".to_string(),
        "http://schemas.xmlsoap.org/soap/envelope/".to_string(),
    );
    envelope.attributes.insert(
        "s:encodingStyle".to_string(),
        "http://schemas.xmlsoap.org/soap/encoding/".to_string(),
    );
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = EmitterConfig::new().perform_indent(true).indent_string("  ");
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8(buf).expect("xmltree emits UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_browse_response() {
        let xml = build_soap_response(
            "urn:schemas-upnp-org:service:ContentDirectory:1",
            "Browse",
            &[
                ("Result", "<DIDL-Lite/>".to_string()),
                ("NumberReturned", "2".to_string()),
                ("TotalMatches", "2".to_string()),
                ("UpdateID", "1".to_string()),
            ],
        )
        .unwrap();

        assert!(xml.contains("u:BrowseResponse"));
        assert!(xml.contains("xmlns:u=\"urn:schemas-upnp-org:service:ContentDirectory:1\""));
        // Le DIDL est échappé dans l'élément Result
        assert!(xml.contains("&lt;DIDL-Lite"));
        assert!(!xml.contains("<DIDL-Lite"));
        assert!(xml.contains("<NumberReturned>2</NumberReturned>"));
        assert!(xml.contains("<UpdateID>1</UpdateID>"));
    }

    #[test]
    fn test_output_order_preserved() {
        let xml = build_soap_response(
            "urn:schemas-upnp-org:service:ContentDirectory:1",
            "Browse",
            &[
                ("Result", String::new()),
                ("NumberReturned", "0".to_string()),
                ("TotalMatches", "0".to_string()),
                ("UpdateID", "0".to_string()),
            ],
        )
        .unwrap();

        let result_pos = xml.find("<Result").unwrap();
        let returned_pos = xml.find("<NumberReturned").unwrap();
        let total_pos = xml.find("<TotalMatches").unwrap();
        assert!(result_pos < returned_pos && returned_pos < total_pos);
    }
}
