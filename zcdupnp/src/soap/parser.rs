//! Parser SOAP pour les actions UPnP entrantes.

use std::collections::HashMap;
use std::io::BufReader;
use xmltree::Element;

/// Action UPnP extraite d'une enveloppe SOAP.
#[derive(Debug, Clone)]
pub struct SoapAction {
    /// Nom de l'action (ex: "Browse")
    pub name: String,

    /// Namespace du service (ex: "urn:schemas-upnp-org:service:ContentDirectory:1")
    pub namespace: Option<String>,

    /// Arguments de l'action, texte brut
    pub args: HashMap<String, String>,
}

impl SoapAction {
    /// Argument obligatoire, ou `None` s'il est absent.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(String::as_str)
    }
}

/// Erreur de parsing SOAP.
#[derive(Debug, thiserror::Error)]
pub enum SoapParseError {
    #[error("XML parse error: {0}")]
    XmlError(#[from] xmltree::ParseError),

    #[error("Missing SOAP Envelope")]
    MissingEnvelope,

    #[error("Missing SOAP Body")]
    MissingBody,

    #[error("No action found in SOAP Body")]
    NoAction,
}

/// Parse le header `SOAPACTION` : `"urn:...:service:ContentDirectory:1#Browse"`.
///
/// # Returns
///
/// Le couple (service, action) sans les guillemets, ou `None` si le header
/// ne suit pas la forme attendue.
pub fn parse_soapaction_header(value: &str) -> Option<(&str, &str)> {
    let value = value.trim().trim_matches('"');
    value.split_once('#')
}

/// Parse une action SOAP depuis le corps XML d'une requête de contrôle.
pub fn parse_soap_action(xml: &[u8]) -> Result<SoapAction, SoapParseError> {
    let reader = BufReader::new(xml);
    let root = Element::parse(reader)?;

    if !root.name.ends_with("Envelope") {
        return Err(SoapParseError::MissingEnvelope);
    }

    // Les clients préfixent librement : on matche sur le nom local
    let body = root
        .children
        .iter()
        .find_map(|n| n.as_element().filter(|e| e.name.ends_with("Body")))
        .ok_or(SoapParseError::MissingBody)?;

    let action_elem = body
        .children
        .iter()
        .find_map(|n| n.as_element())
        .ok_or(SoapParseError::NoAction)?;

    let mut args = HashMap::new();
    for child in &action_elem.children {
        if let Some(elem) = child.as_element() {
            let value = elem.get_text().unwrap_or_default().to_string();
            args.insert(elem.name.clone(), value);
        }
    }

    Ok(SoapAction {
        name: action_elem.name.clone(),
        namespace: action_elem.namespace.clone(),
        args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BROWSE_REQUEST: &str = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"
            s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
  <s:Body>
    <u:Browse xmlns:u="urn:schemas-upnp-org:service:ContentDirectory:1">
      <ObjectID>0</ObjectID>
      <BrowseFlag>BrowseDirectChildren</BrowseFlag>
      <Filter>*</Filter>
      <StartingIndex>0</StartingIndex>
      <RequestedCount>50</RequestedCount>
      <SortCriteria></SortCriteria>
    </u:Browse>
  </s:Body>
</s:Envelope>"#;

    #[test]
    fn test_parse_browse_action() {
        let action = parse_soap_action(BROWSE_REQUEST.as_bytes()).unwrap();
        assert_eq!(action.name, "Browse");
        assert_eq!(
            action.namespace.as_deref(),
            Some("urn:schemas-upnp-org:service:ContentDirectory:1")
        );
        assert_eq!(action.arg("ObjectID"), Some("0"));
        assert_eq!(action.arg("BrowseFlag"), Some("BrowseDirectChildren"));
        assert_eq!(action.arg("RequestedCount"), Some("50"));
        assert_eq!(action.arg("SortCriteria"), Some(""));
    }

    #[test]
    fn test_parse_action_without_args() {
        let xml = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Body>
    <u:GetSystemUpdateID xmlns:u="urn:schemas-upnp-org:service:ContentDirectory:1"/>
  </s:Body>
</s:Envelope>"#;

        let action = parse_soap_action(xml.as_bytes()).unwrap();
        assert_eq!(action.name, "GetSystemUpdateID");
        assert!(action.args.is_empty());
    }

    #[test]
    fn test_missing_body_rejected() {
        let xml = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"></s:Envelope>"#;
        assert!(matches!(
            parse_soap_action(xml.as_bytes()),
            Err(SoapParseError::MissingBody)
        ));
    }

    #[test]
    fn test_not_an_envelope() {
        let xml = "<Totally><Unrelated/></Totally>";
        assert!(matches!(
            parse_soap_action(xml.as_bytes()),
            Err(SoapParseError::MissingEnvelope)
        ));
    }

    #[test]
    fn test_soapaction_header() {
        let (service, action) = parse_soapaction_header(
            "\"urn:schemas-upnp-org:service:ContentDirectory:1#Browse\"",
        )
        .unwrap();
        assert_eq!(service, "urn:schemas-upnp-org:service:ContentDirectory:1");
        assert_eq!(action, "Browse");

        assert!(parse_soapaction_header("no-hash-here").is_none());
    }
}
