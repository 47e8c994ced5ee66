//! Reading and writing the settings file through `rust-ini`.
//!
//! Values are taken literally: no quote stripping and no backslash escapes,
//! so Windows style log paths survive a round trip.

use std::collections::BTreeSet;

use ini::{EscapePolicy, Ini, LineSeparator, ParseOption, WriteOption};

use crate::{ConfigError, ConfigResult};

fn parse_option() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    }
}

fn write_option() -> WriteOption {
    WriteOption {
        escape_policy: EscapePolicy::Nothing,
        line_separator: LineSeparator::CR,
        ..WriteOption::default()
    }
}

/// Parse settings text, rejecting empty section names, lines that are not
/// assignments and repeated sections or keys.
pub fn parse_document(text: &str) -> ConfigResult<Ini> {
    let document = Ini::load_from_str_opt(text, parse_option())?;

    for name in document.sections() {
        let label = name.unwrap_or_default();
        if name.is_some_and(str::is_empty) {
            return Err(ConfigError::malformed("empty section name"));
        }
        if document.section_all(name).count() > 1 {
            return Err(ConfigError::malformed(format!("duplicate section [{label}]")));
        }

        for properties in document.section_all(name) {
            let mut seen = BTreeSet::new();
            for (key, _) in properties.iter() {
                // A line without `=` runs into the next key
                if let Some((line, _)) = key.split_once(['\n', '\r']) {
                    return Err(ConfigError::malformed(format!(
                        "expected key=value, found {:?} in [{label}]",
                        line.trim()
                    )));
                }
                if !seen.insert(key) {
                    return Err(ConfigError::malformed(format!(
                        "duplicate key {key} in [{label}]"
                    )));
                }
            }
        }
    }

    Ok(document)
}

/// Text form of `document`, `\n` terminated
pub fn render_document(document: &Ini) -> ConfigResult<String> {
    let mut buffer = Vec::new();
    document.write_to_opt(&mut buffer, write_option())?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
