// ABOUTME: Shared quick-xml helpers for the two XML format parsers.
// ABOUTME: Prefix-stripping tag names and tolerant attribute access.

use quick_xml::events::BytesStart;
use quick_xml::name::QName;

/// Local element name with any namespace prefix stripped.
///
/// Tag matching is deliberately namespace-tolerant: `content:encoded`,
/// `encoded`, and an extension-prefixed variant all match by local name.
pub(crate) fn local_name(name: QName<'_>) -> String {
    String::from_utf8_lossy(name.local_name().as_ref()).into_owned()
}

/// Attribute value by exact raw key, lossily decoded.
/// Malformed sibling attributes are skipped rather than failing the element.
pub(crate) fn attr(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        if a.key.as_ref() == key.as_bytes() {
            Some(String::from_utf8_lossy(&a.value).into_owned())
        } else {
            None
        }
    })
}

/// Attribute value matched by local key name, ignoring any prefix.
pub(crate) fn attr_local(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        if a.key.local_name().as_ref() == key.as_bytes() {
            Some(String::from_utf8_lossy(&a.value).into_owned())
        } else {
            None
        }
    })
}
