//! Fuzz target for text normalization and notation parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use prelosa::derive::{format_spacing, parse_spacing_code};
use prelosa::text::{normalize_text, parse_notation};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    let normalized = normalize_text(raw);
    let parsed = parse_notation(&normalized);
    if let Some(spacing) = parsed.spacing {
        let _ = parse_spacing_code(&format_spacing(spacing));
    }
});
