//! Shared lopdf helpers used by the page image discovery.

use lopdf::{Dictionary, Document, Object};

/// Follow one level of indirection: references are looked up in `document`,
/// direct objects are returned as they are.
pub fn resolve<'a>(document: &'a Document, value: &'a Object) -> Option<&'a Object> {
    match value {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Resolve a value that might be an inline dictionary or a reference to one.
pub fn resolve_dict<'a>(document: &'a Document, value: &'a Object) -> Option<&'a Dictionary> {
    resolve(document, value).and_then(|o| o.as_dict().ok())
}

/// Read a name entry (e.g. `/Subtype`), resolving a reference if needed.
pub fn name_from_dict<'a>(document: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a [u8]> {
    match resolve(document, dict.get(key).ok()?)? {
        Object::Name(name) => Some(name.as_slice()),
        _ => None,
    }
}

/// Read a non-negative integer entry (e.g. `/Width`), resolving a reference if needed.
pub fn usize_from_dict(document: &Document, dict: &Dictionary, key: &[u8]) -> Option<usize> {
    match resolve(document, dict.get(key).ok()?)? {
        Object::Integer(n) => usize::try_from(*n).ok(),
        _ => None,
    }
}

/// The `/Filter` chain of a stream dictionary in application order.
///
/// A single name and an array of names are both accepted; an absent entry
/// yields an empty list.
pub fn filter_names(document: &Document, dict: &Dictionary) -> Vec<Vec<u8>> {
    let filter = match dict.get(b"Filter").ok().and_then(|f| resolve(document, f)) {
        Some(f) => f,
        None => return Vec::new(),
    };

    match filter {
        Object::Name(name) => vec![name.clone()],
        Object::Array(items) => items
            .iter()
            .filter_map(|item| match resolve(document, item) {
                Some(Object::Name(name)) => Some(name.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
