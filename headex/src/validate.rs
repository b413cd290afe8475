//! Validation of candidate profile strings.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

/// Check that `head` is a base64-encoded JSON object shaped like a player
/// profile: a `textures` object holding a `SKIN` entry with a string `url`.
///
/// An invalid candidate is an expected outcome rather than an error;
/// anything that fails to decode, parse, or match the shape is `false`. The
/// url is not fetched or interpreted further.
pub fn validate(head: &str) -> bool {
    let bytes = match STANDARD.decode(head) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let node: Value = match serde_json::from_slice(&bytes) {
        Ok(node) => node,
        Err(_) => return false,
    };

    if !node.is_object() {
        return false;
    }

    let textures = match node.get("textures") {
        Some(textures) if textures.is_object() => textures,
        _ => return false,
    };

    // The SKIN entry is not itself required to be an object; a non-object
    // simply has no url to find.
    match textures.get("SKIN") {
        Some(skin) => matches!(skin.get("url"), Some(url) if url.is_string()),
        None => false,
    }
}
