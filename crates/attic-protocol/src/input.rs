//! Client-side input parsing, validated before anything hits the wire.

use crate::error::ProtocolError;

/// Parse a user-supplied byte list: comma or whitespace separated hex
/// values, each optionally `$`-prefixed.
pub fn parse_hex_bytes(s: &str) -> Result<Vec<u8>, ProtocolError> {
    let mut bytes = Vec::new();
    for token in s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let digits = token.strip_prefix('$').unwrap_or(token);
        let value = u8::from_str_radix(digits, 16)
            .map_err(|_| ProtocolError::InvalidHexByte(token.to_string()))?;
        bytes.push(value);
    }
    if bytes.is_empty() {
        return Err(ProtocolError::EmptyBytes);
    }
    Ok(bytes)
}

/// Escape text for the `inject keys` command.
///
/// Backslashes are escaped first so later substitutions cannot double-escape
/// the backslashes they introduce.
pub fn escape_for_inject(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(' ', "\\s")
        .replace('\n', "\\n")
        .replace('\t', "\\t")
        .replace('\r', "\\r")
}

/// Translate a key name to the keystroke the server injects.
///
/// Recognizes the named keys of the original CLI plus `SHIFT+<key>` and
/// `CTRL+<letter>` combinations; anything else passes through unchanged.
pub fn translate_key(name: &str) -> String {
    let upper = name.to_ascii_uppercase();
    match upper.as_str() {
        "RETURN" | "ENTER" => "\n".to_string(),
        "SPACE" => " ".to_string(),
        "TAB" => "\t".to_string(),
        "ESC" | "ESCAPE" => "\x1b".to_string(),
        "DELETE" | "BACKSPACE" => "\x7f".to_string(),
        "BREAK" => "\x03".to_string(),
        _ => {
            if let Some(rest) = upper.strip_prefix("SHIFT+") {
                return rest.to_string();
            }
            if let Some(rest) = upper.strip_prefix("CTRL+") {
                let mut chars = rest.chars();
                if let (Some(c), None) = (chars.next(), chars.next()) {
                    if c.is_ascii_uppercase() {
                        return ((c as u8 - b'A' + 1) as char).to_string();
                    }
                }
            }
            name.to_string()
        }
    }
}
