//! XML bodies exchanged with the inventory API.

use std::collections::HashMap;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::InventoryError;
use crate::types::{DeviceIdentity, Site};

const COMPUTER_ID: &str = "computer/general/id";
const COMPUTER_SITE_NAME: &str = "computer/general/site/name";
const COMPUTER_OWNER: &str = "computer/location/username";
const SITE_ID: &str = "site/id";
const SITE_NAME: &str = "site/name";

/// Text content of every element, keyed by its slash-joined path from the
/// root. The first occurrence of a path wins; empty elements map to "".
pub fn element_texts(xml: &str) -> Result<HashMap<String, String>, InventoryError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut values = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                text.clear();
            }
            Ok(Event::Empty(e)) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                values.entry(path.join("/")).or_insert_with(String::new);
                path.pop();
            }
            Ok(Event::Text(e)) => {
                let unescaped = e
                    .unescape()
                    .map_err(|e| InventoryError::Xml(e.to_string()))?;
                text.push_str(&unescaped);
            }
            Ok(Event::CData(e)) => {
                text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(Event::End(_)) => {
                values
                    .entry(path.join("/"))
                    .or_insert_with(|| text.trim().to_string());
                text.clear();
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(InventoryError::Xml(format!(
                    "error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    if !path.is_empty() {
        return Err(InventoryError::Xml(format!(
            "document ended inside <{}>",
            path.join("/")
        )));
    }
    if values.is_empty() {
        return Err(InventoryError::Xml("document has no elements".to_string()));
    }

    Ok(values)
}

fn non_empty<'a>(values: &'a HashMap<String, String>, path: &str) -> Option<&'a str> {
    values
        .get(path)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

/// Device record from a computer document.
pub fn parse_device(serial: &str, xml: &str) -> Result<DeviceIdentity, InventoryError> {
    let values = element_texts(xml)?;
    let id = non_empty(&values, COMPUTER_ID).ok_or_else(|| InventoryError::MissingField {
        key: serial.to_string(),
        field: "device id",
    })?;

    Ok(DeviceIdentity {
        id: id.to_string(),
        serial: serial.to_string(),
        site_name: non_empty(&values, COMPUTER_SITE_NAME)
            .unwrap_or_default()
            .to_string(),
    })
}

/// Owner username from a computer document.
pub fn parse_owner(serial: &str, xml: &str) -> Result<String, InventoryError> {
    let values = element_texts(xml)?;
    non_empty(&values, COMPUTER_OWNER)
        .map(str::to_string)
        .ok_or_else(|| InventoryError::MissingField {
            key: serial.to_string(),
            field: "owner username",
        })
}

/// Site from a site document.
pub fn parse_site(name: &str, xml: &str) -> Result<Site, InventoryError> {
    let values = element_texts(xml)?;
    let missing = |field| InventoryError::MissingField {
        key: name.to_string(),
        field,
    };
    let id = non_empty(&values, SITE_ID).ok_or_else(|| missing("site id"))?;
    let site_name = non_empty(&values, SITE_NAME).ok_or_else(|| missing("site name"))?;
    Ok(Site::new(id, site_name))
}

/// Minimal computer document that assigns the device to `site`.
pub fn site_update_document(site: &Site) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><computer><general><site><id>{}</id><name>{}</name></site></general></computer>",
        escape(site.id.as_str()),
        escape(site.name.as_str())
    )
}
