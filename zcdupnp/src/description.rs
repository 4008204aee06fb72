//! Description du device racine et documents SCPD.
//!
//! La description est construite avec xmltree depuis l'identité partagée ;
//! les SCPD sont des documents fixes.

use xmltree::{Element, EmitterConfig, XMLNode};
use zcdconfig::DeviceIdentity;

use crate::{
    CONNECTION_MANAGER_SERVICE_TYPE, CONTENT_DIRECTORY_SERVICE_TYPE, MEDIA_SERVER_DEVICE_TYPE,
};

/// Document de description du device racine, servi sur `/description.xml`.
///
/// UPnP 1.0, deviceType MediaServer:1, deux services (ContentDirectory et
/// ConnectionManager) et le marqueur DLNADOC `DMS-1.50` attendu par les
/// clients DLNA stricts.
pub fn device_description(identity: &DeviceIdentity) -> String {
    let mut root = Element::new("root");
    root.attributes.insert(
        "xmlns".to_string(),
        "urn:schemas-upnp-org:device-1-0".to_string(),
    );
    root.attributes.insert(
        "xmlns:dlna".to_string(),
        "urn:schemas-dlna-org:device-1-0".to_string(),
    );

    let mut spec_version = Element::new("specVersion");
    push_text(&mut spec_version, "major", "1");
    push_text(&mut spec_version, "minor", "0");
    root.children.push(XMLNode::Element(spec_version));

    let mut device = Element::new("device");
    push_text(&mut device, "deviceType", MEDIA_SERVER_DEVICE_TYPE);
    push_text(&mut device, "friendlyName", &identity.friendly_name);
    push_text(&mut device, "manufacturer", &identity.manufacturer);
    push_text(
        &mut device,
        "manufacturerURL",
        "https://github.com/richstokes/ZeroConfigDLNA",
    );
    push_text(&mut device, "modelDescription", "DLNA/UPnP Media Server");
    push_text(&mut device, "modelName", &identity.model_name);
    push_text(&mut device, "modelNumber", &identity.model_number);
    push_text(
        &mut device,
        "modelURL",
        "https://github.com/richstokes/ZeroConfigDLNA",
    );
    push_text(&mut device, "serialNumber", "12345678");
    push_text(&mut device, "UDN", &identity.udn);
    push_text(&mut device, "dlna:X_DLNADOC", "DMS-1.50");

    let mut service_list = Element::new("serviceList");
    service_list.children.push(XMLNode::Element(service_entry(
        CONTENT_DIRECTORY_SERVICE_TYPE,
        "urn:upnp-org:serviceId:ContentDirectory",
        "/ContentDirectory.xml",
        "/ContentDirectory/control",
    )));
    service_list.children.push(XMLNode::Element(service_entry(
        CONNECTION_MANAGER_SERVICE_TYPE,
        "urn:upnp-org:serviceId:ConnectionManager",
        "/ConnectionManager.xml",
        "/ConnectionManager/control",
    )));
    device.children.push(XMLNode::Element(service_list));

    push_text(
        &mut device,
        "presentationURL",
        &format!("{}browse", identity.base_url()),
    );
    root.children.push(XMLNode::Element(device));

    let mut buf = Vec::new();
    let config = EmitterConfig::new().perform_indent(true).indent_string("  ");
    root.write_with_config(&mut buf, config)
        .expect("in-memory write cannot fail");

    String::from_utf8(buf).expect("xmltree emits UTF-8")
}

fn service_entry(service_type: &str, service_id: &str, scpd: &str, control: &str) -> Element {
    let mut service = Element::new("service");
    push_text(&mut service, "serviceType", service_type);
    push_text(&mut service, "serviceId", service_id);
    push_text(&mut service, "SCPDURL", scpd);
    push_text(&mut service, "controlURL", control);
    push_text(&mut service, "eventSubURL", "/events");
    service
}

fn push_text(parent: &mut Element, name: &str, value: &str) {
    let mut elem = Element::new(name);
    elem.children.push(XMLNode::Text(value.to_string()));
    parent.children.push(XMLNode::Element(elem));
}

/// SCPD du service ContentDirectory.
pub const CONTENT_DIRECTORY_SCPD: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<scpd xmlns="urn:schemas-upnp-org:service-1-0">
<specVersion>
    <major>1</major>
    <minor>0</minor>
</specVersion>
<actionList>
    <action>
        <name>Browse</name>
        <argumentList>
            <argument>
                <name>ObjectID</name>
                <direction>in</direction>
                <relatedStateVariable>A_ARG_TYPE_ObjectID</relatedStateVariable>
            </argument>
            <argument>
                <name>BrowseFlag</name>
                <direction>in</direction>
                <relatedStateVariable>A_ARG_TYPE_BrowseFlag</relatedStateVariable>
            </argument>
            <argument>
                <name>Filter</name>
                <direction>in</direction>
                <relatedStateVariable>A_ARG_TYPE_Filter</relatedStateVariable>
            </argument>
            <argument>
                <name>StartingIndex</name>
                <direction>in</direction>
                <relatedStateVariable>A_ARG_TYPE_Index</relatedStateVariable>
            </argument>
            <argument>
                <name>RequestedCount</name>
                <direction>in</direction>
                <relatedStateVariable>A_ARG_TYPE_Count</relatedStateVariable>
            </argument>
            <argument>
                <name>SortCriteria</name>
                <direction>in</direction>
                <relatedStateVariable>A_ARG_TYPE_SortCriteria</relatedStateVariable>
            </argument>
            <argument>
                <name>Result</name>
                <direction>out</direction>
                <relatedStateVariable>A_ARG_TYPE_Result</relatedStateVariable>
            </argument>
            <argument>
                <name>NumberReturned</name>
                <direction>out</direction>
                <relatedStateVariable>A_ARG_TYPE_Count</relatedStateVariable>
            </argument>
            <argument>
                <name>TotalMatches</name>
                <direction>out</direction>
                <relatedStateVariable>A_ARG_TYPE_Count</relatedStateVariable>
            </argument>
            <argument>
                <name>UpdateID</name>
                <direction>out</direction>
                <relatedStateVariable>A_ARG_TYPE_UpdateID</relatedStateVariable>
            </argument>
        </argumentList>
    </action>
    <action>
        <name>GetSearchCapabilities</name>
        <argumentList>
            <argument>
                <name>SearchCaps</name>
                <direction>out</direction>
                <relatedStateVariable>SearchCapabilities</relatedStateVariable>
            </argument>
        </argumentList>
    </action>
    <action>
        <name>GetSortCapabilities</name>
        <argumentList>
            <argument>
                <name>SortCaps</name>
                <direction>out</direction>
                <relatedStateVariable>SortCapabilities</relatedStateVariable>
            </argument>
        </argumentList>
    </action>
    <action>
        <name>GetSystemUpdateID</name>
        <argumentList>
            <argument>
                <name>Id</name>
                <direction>out</direction>
                <relatedStateVariable>SystemUpdateID</relatedStateVariable>
            </argument>
        </argumentList>
    </action>
</actionList>
<serviceStateTable>
    <stateVariable sendEvents="no">
        <name>A_ARG_TYPE_ObjectID</name>
        <dataType>string</dataType>
    </stateVariable>
    <stateVariable sendEvents="no">
        <name>A_ARG_TYPE_BrowseFlag</name>
        <dataType>string</dataType>
        <allowedValueList>
            <allowedValue>BrowseMetadata</allowedValue>
            <allowedValue>BrowseDirectChildren</allowedValue>
        </allowedValueList>
    </stateVariable>
    <stateVariable sendEvents="no">
        <name>A_ARG_TYPE_Filter</name>
        <dataType>string</dataType>
    </stateVariable>
    <stateVariable sendEvents="no">
        <name>A_ARG_TYPE_Index</name>
        <dataType>ui4</dataType>
    </stateVariable>
    <stateVariable sendEvents="no">
        <name>A_ARG_TYPE_Count</name>
        <dataType>ui4</dataType>
    </stateVariable>
    <stateVariable sendEvents="no">
        <name>A_ARG_TYPE_SortCriteria</name>
        <dataType>string</dataType>
    </stateVariable>
    <stateVariable sendEvents="no">
        <name>A_ARG_TYPE_Result</name>
        <dataType>string</dataType>
    </stateVariable>
    <stateVariable sendEvents="no">
        <name>A_ARG_TYPE_UpdateID</name>
        <dataType>ui4</dataType>
    </stateVariable>
    <stateVariable sendEvents="no">
        <name>SearchCapabilities</name>
        <dataType>string</dataType>
    </stateVariable>
    <stateVariable sendEvents="no">
        <name>SortCapabilities</name>
        <dataType>string</dataType>
    </stateVariable>
    <stateVariable sendEvents="yes">
        <name>SystemUpdateID</name>
        <dataType>ui4</dataType>
    </stateVariable>
</serviceStateTable>
</scpd>"#;

/// SCPD du service ConnectionManager.
pub const CONNECTION_MANAGER_SCPD: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<scpd xmlns="urn:schemas-upnp-org:service-1-0">
<specVersion>
    <major>1</major>
    <minor>0</minor>
</specVersion>
<actionList>
    <action>
        <name>GetProtocolInfo</name>
        <argumentList>
            <argument>
                <name>Source</name>
                <direction>out</direction>
                <relatedStateVariable>SourceProtocolInfo</relatedStateVariable>
            </argument>
            <argument>
                <name>Sink</name>
                <direction>out</direction>
                <relatedStateVariable>SinkProtocolInfo</relatedStateVariable>
            </argument>
        </argumentList>
    </action>
    <action>
        <name>GetCurrentConnectionIDs</name>
        <argumentList>
            <argument>
                <name>ConnectionIDs</name>
                <direction>out</direction>
                <relatedStateVariable>CurrentConnectionIDs</relatedStateVariable>
            </argument>
        </argumentList>
    </action>
    <action>
        <name>GetCurrentConnectionInfo</name>
        <argumentList>
            <argument>
                <name>ConnectionID</name>
                <direction>in</direction>
                <relatedStateVariable>A_ARG_TYPE_ConnectionID</relatedStateVariable>
            </argument>
            <argument>
                <name>RcsID</name>
                <direction>out</direction>
                <relatedStateVariable>A_ARG_TYPE_RcsID</relatedStateVariable>
            </argument>
            <argument>
                <name>AVTransportID</name>
                <direction>out</direction>
                <relatedStateVariable>A_ARG_TYPE_AVTransportID</relatedStateVariable>
            </argument>
            <argument>
                <name>ProtocolInfo</name>
                <direction>out</direction>
                <relatedStateVariable>A_ARG_TYPE_ProtocolInfo</relatedStateVariable>
            </argument>
            <argument>
                <name>PeerConnectionManager</name>
                <direction>out</direction>
                <relatedStateVariable>A_ARG_TYPE_ConnectionManager</relatedStateVariable>
            </argument>
            <argument>
                <name>PeerConnectionID</name>
                <direction>out</direction>
                <relatedStateVariable>A_ARG_TYPE_ConnectionID</relatedStateVariable>
            </argument>
            <argument>
                <name>Direction</name>
                <direction>out</direction>
                <relatedStateVariable>A_ARG_TYPE_Direction</relatedStateVariable>
            </argument>
            <argument>
                <name>Status</name>
                <direction>out</direction>
                <relatedStateVariable>A_ARG_TYPE_ConnectionStatus</relatedStateVariable>
            </argument>
        </argumentList>
    </action>
</actionList>
<serviceStateTable>
    <stateVariable sendEvents="no">
        <name>SourceProtocolInfo</name>
        <dataType>string</dataType>
    </stateVariable>
    <stateVariable sendEvents="no">
        <name>SinkProtocolInfo</name>
        <dataType>string</dataType>
    </stateVariable>
    <stateVariable sendEvents="yes">
        <name>CurrentConnectionIDs</name>
        <dataType>string</dataType>
    </stateVariable>
    <stateVariable sendEvents="no">
        <name>A_ARG_TYPE_ConnectionID</name>
        <dataType>i4</dataType>
    </stateVariable>
    <stateVariable sendEvents="no">
        <name>A_ARG_TYPE_RcsID</name>
        <dataType>i4</dataType>
    </stateVariable>
    <stateVariable sendEvents="no">
        <name>A_ARG_TYPE_AVTransportID</name>
        <dataType>i4</dataType>
    </stateVariable>
    <stateVariable sendEvents="no">
        <name>A_ARG_TYPE_ProtocolInfo</name>
        <dataType>string</dataType>
    </stateVariable>
    <stateVariable sendEvents="no">
        <name>A_ARG_TYPE_ConnectionManager</name>
        <dataType>string</dataType>
    </stateVariable>
    <stateVariable sendEvents="no">
        <name>A_ARG_TYPE_Direction</name>
        <dataType>string</dataType>
        <allowedValueList>
            <allowedValue>Input</allowedValue>
            <allowedValue>Output</allowedValue>
        </allowedValueList>
    </stateVariable>
    <stateVariable sendEvents="no">
        <name>A_ARG_TYPE_ConnectionStatus</name>
        <dataType>string</dataType>
        <allowedValueList>
            <allowedValue>OK</allowedValue>
            <allowedValue>ContentFormatMismatch</allowedValue>
            <allowedValue>InsufficientBandwidth</allowedValue>
            <allowedValue>UnreliableChannel</allowedValue>
            <allowedValue>Unknown</allowedValue>
        </allowedValueList>
    </stateVariable>
</serviceStateTable>
</scpd>"#;
