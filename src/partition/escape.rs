//! Escaping of partition values in path segments

use crate::storage::percent_decode;
use std::fmt::Write;

/// Directory value used for null partition values
pub const DEFAULT_PARTITION_NAME: &str = "__HIVE_DEFAULT_PARTITION__";

fn needs_escape(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '"' | '#' | '%' | '\'' | '*' | '/' | ':' | '=' | '?' | '\\' | '{' | '[' | ']' | '^'
        )
}

/// Escape a partition value for use in a `column=value` segment
///
/// `None` maps to [`DEFAULT_PARTITION_NAME`]. A value spelled like the
/// null marker gets its leading `_` escaped so the two stay distinct.
pub fn escape_value(value: Option<&str>) -> String {
    let Some(value) = value else {
        return DEFAULT_PARTITION_NAME.to_string();
    };
    if value == DEFAULT_PARTITION_NAME {
        return format!("%5F{}", &DEFAULT_PARTITION_NAME[1..]);
    }

    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if needs_escape(c) {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                let _ = write!(out, "%{byte:02X}");
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Reverse [`escape_value`]
pub fn unescape_value(segment: &str) -> Option<String> {
    if segment == DEFAULT_PARTITION_NAME {
        None
    } else {
        Some(percent_decode(segment))
    }
}
