//! Faults SOAP avec détail UPnPError.

use xmltree::{Element, EmitterConfig, XMLNode};

/// Construit un fault SOAP portant un code d'erreur UPnP.
///
/// Le faultcode est toujours `s:Client` et le faultstring `UPnPError`, la
/// vraie information étant le bloc `<UPnPError>` du détail. Servi avec un
/// statut HTTP 500 comme le veut UPnP 1.0.
pub fn build_soap_fault(error_code: u16, error_description: &str) -> String {
    let mut fault = Element::new("s:Fault");

    let mut faultcode = Element::new("faultcode");
    faultcode.children.push(XMLNode::Text("s:Client".to_string()));
    fault.children.push(XMLNode::Element(faultcode));

    let mut faultstring = Element::new("faultstring");
    faultstring
        .children
        .push(XMLNode::Text("UPnPError".to_string()));
    fault.children.push(XMLNode::Element(faultstring));

    let mut upnp_error = Element::new("UPnPError");
    upnp_error.attributes.insert(
        "xmlns".to_string(),
        "urn:schemas-upnp-org:control-1-0".to_string(),
    );

    let mut code_elem = Element::new("errorCode");
    code_elem
        .children
        .push(XMLNode::Text(error_code.to_string()));
    upnp_error.children.push(XMLNode::Element(code_elem));

    let mut desc_elem = Element::new("errorDescription");
    desc_elem
        .children
        .push(XMLNode::Text(error_description.to_string()));
    upnp_error.children.push(XMLNode::Element(desc_elem));

    let mut detail = Element::new("detail");
    detail.children.push(XMLNode::Element(upnp_error));
    fault.children.push(XMLNode::Element(detail));

    let mut body = Element::new("s:Body");
    body.children.push(XMLNode::Element(fault));

    let mut envelope = Element::new("s:Envelope");
    envelope.attributes.insert(
        "xmlns:s".to_string(),
        "http://schemas.xmlsoap.org/soap/envelope/".to_string(),
    );
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = EmitterConfig::new().perform_indent(true).indent_string("  ");
    envelope
        .write_with_config(&mut buf, config)
        .expect("in-memory write cannot fail");

    String::from_utf8(buf).expect("xmltree emits UTF-8")
}
