//! Normalization of raw drawing text.
//!
//! CAD text arrives with MText formatting codes, the `%%C` diameter escape,
//! doubled quotes from spreadsheet round-trips, and typographic quotes typed
//! by hand. The notation grammars only understand the plain form.

use std::sync::LazyLock;

use regex::Regex;

/// The diameter symbol the notation grammars expect.
pub const DIAMETER_SYMBOL: char = '∅';

/// Escapes that stand for the diameter symbol.
const DIAMETER_ESCAPES: [&str; 5] = ["%%C", "%%c", "\\U+2205", "\\U+00D8", "\\U+00d8"];

/// MText formatting codes: backslash, letters/digits, semicolon (`\A1;`, `\fArial;`).
static FORMAT_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[A-Za-z0-9]+;").expect("valid format code regex"));

/// Numeric diameter glued to a millimetre suffix (`8mm`).
static MM_SUFFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)([mM][mM])\b").expect("valid mm suffix regex"));

/// Normalizes raw drawing text. Deterministic and order-sensitive:
///
/// 1. diameter escapes become `∅`; MText format codes and grouping braces are
///    stripped;
/// 2. doubled straight quotes `""` become `"`;
/// 3. a millimetre suffix is separated from its number (`8mm` → `8 mm`);
/// 4. typographic quotes become straight quotes.
///
/// The result is trimmed; an empty string means there is nothing to parse.
pub fn normalize_text(raw: &str) -> String {
    let mut text = raw.to_string();

    let symbol = DIAMETER_SYMBOL.to_string();
    for escape in DIAMETER_ESCAPES {
        if text.contains(escape) {
            text = text.replace(escape, &symbol);
        }
    }
    text = FORMAT_CODE_REGEX.replace_all(&text, "").into_owned();
    text.retain(|c| c != '{' && c != '}');

    text = text.replace("\"\"", "\"");

    text = MM_SUFFIX_REGEX.replace_all(&text, "$1 $2").into_owned();

    text = text
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{2032}' => '\'',
            other => other,
        })
        .collect();

    text.trim().to_string()
}
