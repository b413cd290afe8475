//! Heuristics that locate candidate profile strings in decoded tag trees
//! and in raw text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::nbt::{CompoundMap, Tag, Value};

// Quoted runs of base64, tolerating an escaped quote on either side so
// profiles inside already-escaped command JSON are still found. The final
// 4-character block may be unpadded or end in = or ==.
static BASE64_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\\?["']((?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{4}|[A-Za-z0-9+/]{3}=|[A-Za-z0-9+/]{2}==))\\?["']"#,
    )
    .unwrap()
});

/// Walk a decoded tag tree, handing every string that might hold a head
/// profile to `emit`.
///
/// Two generations of the game's item data store head textures differently:
/// a list named `textures` whose first element carries a `Value` string
/// (pre-1.20.5), and a list named `properties` whose first element carries
/// `name`/`value` strings with `name` equal to `"textures"` (the item
/// component rework). Only the first element of either list is inspected;
/// the targeted schemas never carry more than one relevant entry. This is a
/// heuristic for data the game writes, not a guarantee for every possible
/// producer of such tags.
///
/// Plain string values are scanned as text, since stored command text can
/// embed an already-quoted profile.
pub fn scan_tag(root: &Value, emit: &mut dyn FnMut(&str)) {
    // The tree is acyclic but its depth is unbounded, so walk with an
    // explicit stack. Compound children carry their key as a name; list
    // elements have none.
    let mut stack: Vec<(Option<&str>, &Value)> = vec![(None, root)];

    while let Some((name, value)) = stack.pop() {
        match value {
            Value::Compound(compound) => {
                for (key, child) in compound {
                    stack.push((Some(key.as_str()), child));
                }
            }
            Value::List(element_tag, elements) => {
                if !matches!(element_tag, Tag::String | Tag::List | Tag::Compound) {
                    // this list can't store player profiles
                    continue;
                }

                match name {
                    // pre-1.20.5 item NBT
                    Some("textures") => {
                        if let Some(texture) = first_compound(elements) {
                            if let Some(value) = texture.get("Value").and_then(Value::as_str) {
                                emit(value);
                            }
                        }
                    }
                    // item component storage
                    Some("properties") => {
                        if let Some(texture) = first_compound(elements) {
                            let prop = texture.get("name").and_then(Value::as_str);
                            let value = texture.get("value").and_then(Value::as_str);
                            if let (Some("textures"), Some(value)) = (prop, value) {
                                emit(value);
                            }
                        }
                    }
                    // scan the elements of any other list
                    _ => {
                        for element in elements {
                            stack.push((None, element));
                        }
                    }
                }
            }
            Value::String(s) => scan_text(s, emit),
            _ => {}
        }
    }
}

fn first_compound(elements: &[Value]) -> Option<&CompoundMap> {
    match elements.first() {
        Some(Value::Compound(compound)) => Some(compound),
        _ => None,
    }
}

/// Find every quoted base64 token in `text`, handing each to `emit` without
/// its surrounding quotes. Matches are non-overlapping and the whole text is
/// scanned.
pub fn scan_text(text: &str, emit: &mut dyn FnMut(&str)) {
    for capture in BASE64_TOKEN.captures_iter(text) {
        emit(&capture[1]);
    }
}
